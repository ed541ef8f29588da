//! Raw-stream reconstruction (component R).

mod reconstructor;
mod stream;

pub use reconstructor::{merge_confirmed_stream, reconstruct};
pub use stream::{Match, Stream};
