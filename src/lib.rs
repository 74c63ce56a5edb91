#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod kif;
pub mod loader;
pub mod playback;
pub mod registry;
pub mod test_util;
pub mod util;
pub mod viewer;
