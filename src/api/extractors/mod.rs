mod verified;

pub use verified::Verified;
