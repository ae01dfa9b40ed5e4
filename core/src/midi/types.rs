pub type U3 = u8;
pub type U4 = u8;
pub type U7 = u8;
pub type U14 = u16;
