pub mod traits;

pub use traits::{Disposable, FrameworkComponent};
