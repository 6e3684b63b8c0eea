pub mod candidate;
pub mod dispatch;
pub mod opportunity;

/// Shape checks applied at the decode boundary. A value that fails them is
/// never handed to the workflow; the caller falls back instead.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate().map_err(|e| format!("item {i}: {e}")))
    }
}
