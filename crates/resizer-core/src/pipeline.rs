//! Invocation pipeline around worksheet function calls.
//!
//! A call runs through three stages: every hook's `before` in order (any
//! hook may answer the call itself and skip the computation), the
//! computation, then every hook's `after` or `on_failure` in reverse order.

use std::sync::Arc;

use resizer_engine::engine::Computation;

pub type ComputationError = Box<dyn std::error::Error + Send + Sync>;
pub type ComputationResult = std::result::Result<Computation, ComputationError>;

/// One call of a worksheet function. Hooks ask the host for the calling
/// range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
}

impl Invocation {
    pub fn new(function: impl Into<String>) -> Self {
        Invocation {
            function: function.into(),
        }
    }
}

/// Result of a `before` hook.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Continue,
    /// Skip the computation and return this value.
    Return(Computation),
}

pub trait InvocationHook: Send + Sync {
    fn before(&self, _call: &Invocation) -> Flow {
        Flow::Continue
    }

    fn after(&self, _call: &Invocation, result: Computation) -> Computation {
        result
    }

    /// Turn a failed computation into a value. `None` passes the failure on
    /// to the next hook.
    fn on_failure(&self, _call: &Invocation, _error: &ComputationError) -> Option<Computation> {
        None
    }
}

#[derive(Clone, Default)]
pub struct Pipeline {
    hooks: Vec<Arc<dyn InvocationHook>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(mut self, hook: impl InvocationHook + 'static) -> Self {
        self.push(Arc::new(hook));
        self
    }

    pub fn push(&mut self, hook: Arc<dyn InvocationHook>) {
        self.hooks.push(hook);
    }

    /// Run `compute` through the hooks. Failures nobody handles become a
    /// message value, so a call always produces something to display.
    pub fn invoke(
        &self,
        call: &Invocation,
        compute: impl FnOnce() -> ComputationResult,
    ) -> Computation {
        for hook in &self.hooks {
            if let Flow::Return(value) = hook.before(call) {
                return value;
            }
        }

        match compute() {
            Ok(result) => self
                .hooks
                .iter()
                .rev()
                .fold(result, |result, hook| hook.after(call, result)),
            Err(error) => self
                .hooks
                .iter()
                .rev()
                .find_map(|hook| hook.on_failure(call, &error))
                .unwrap_or_else(|| Computation::message(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resizer_engine::engine::CellValue;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        short_circuit: bool,
    }

    impl InvocationHook for Recorder {
        fn before(&self, _call: &Invocation) -> Flow {
            self.log.lock().unwrap().push(format!("{} before", self.name));
            if self.short_circuit {
                Flow::Return(Computation::message(self.name))
            } else {
                Flow::Continue
            }
        }

        fn after(&self, _call: &Invocation, result: Computation) -> Computation {
            self.log.lock().unwrap().push(format!("{} after", self.name));
            result
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>, short_circuit: bool) -> Recorder {
        Recorder {
            name,
            log: Arc::clone(log),
            short_circuit,
        }
    }

    #[test]
    fn test_hooks_wrap_computation_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new()
            .with_hook(recorder("outer", &log, false))
            .with_hook(recorder("inner", &log, false));

        let call = Invocation::new("F");
        let result = pipeline.invoke(&call, || {
            log.lock().unwrap().push("compute".to_string());
            Ok(Computation::Scalar(CellValue::Number(1.0)))
        });

        assert_eq!(result, Computation::Scalar(CellValue::Number(1.0)));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer before", "inner before", "compute", "inner after", "outer after"]
        );
    }

    #[test]
    fn test_before_can_skip_computation() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new().with_hook(recorder("gate", &log, true));

        let mut computed = false;
        let result = pipeline.invoke(&Invocation::new("F"), || {
            computed = true;
            Ok(Computation::not_available())
        });

        assert!(!computed);
        assert_eq!(result, Computation::message("gate"));
    }

    #[test]
    fn test_unhandled_failure_becomes_message() {
        let pipeline = Pipeline::new();
        let result = pipeline.invoke(&Invocation::new("F"), || Err("boom".into()));
        assert_eq!(result, Computation::message("boom"));
    }
}
