pub mod google;
pub mod logout;
pub mod me;
