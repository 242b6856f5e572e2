use crate::signal::Signal;

/// Either a replacement value or a function of the previous value.
pub enum SetStateAction<T> {
    Value(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

impl<T> SetStateAction<T> {
    /// Wrap a function of the previous value.
    pub fn update(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Update(Box::new(f))
    }
}

impl<T> From<T> for SetStateAction<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// Setter half of a bound state.
///
/// Every call replaces the value and re-runs whatever depends on it,
/// including the write back to storage.
pub struct SetState<T> {
    state: Signal<T>,
}

impl<T: Send + Sync + 'static> SetState<T> {
    pub(crate) fn new(state: Signal<T>) -> Self {
        Self { state }
    }

    /// Apply a [`SetStateAction`].
    pub fn dispatch(&self, action: impl Into<SetStateAction<T>>) {
        match action.into() {
            SetStateAction::Value(value) => self.state.set(value),
            SetStateAction::Update(f) => self.update(f),
        }
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        self.state.set(value);
    }

    /// Compute the next value from the previous one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.state.with_untracked(f);
        self.state.set(next);
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_value_and_update() {
        let state = Signal::new(1);
        let set = SetState::new(state.clone());

        set.dispatch(5);
        assert_eq!(state.get(), 5);

        set.dispatch(SetStateAction::update(|prev| prev * 2));
        assert_eq!(state.get(), 10);

        set.update(|prev| prev + 1);
        assert_eq!(state.get(), 11);
    }
}
