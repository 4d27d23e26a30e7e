pub mod board_member;
pub mod contact;
pub mod event;
pub mod member;
pub mod newsletter;
pub mod semester;
