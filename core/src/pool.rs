pub type Allocator<T> = dyn Fn() -> Box<T>;
pub type Reset<T> = dyn Fn(&mut T);

/// A set of preallocated items that can be borrowed and given back,
/// so that the real-time threads don't need to allocate.
#[allow(clippy::vec_box)]
pub struct Pool<T> {
  allocator: Box<Allocator<T>>,
  reset: Box<Reset<T>>,
  items: Vec<Box<T>>,
}

impl<T> Pool<T> {
  pub fn new(capacity: usize, allocator: Box<Allocator<T>>, reset: Box<Reset<T>>) -> Pool<T> {
    let items = (0..capacity).map(|_| (allocator)()).collect();

    Pool {
      allocator,
      reset,
      items,
    }
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&mut self) -> Option<Box<T>> {
    self.items.pop()
  }

  pub fn get_or_alloc(&mut self) -> Box<T> {
    let alloc = &*self.allocator;
    self.items.pop().unwrap_or_else(alloc)
  }

  /// Gives an item back after resetting it.
  pub fn release(&mut self, mut item: Box<T>) {
    (self.reset)(&mut item);
    self.items.push(item);
  }
}
