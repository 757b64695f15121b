/// Logging capability handed explicitly to the parsers so that the
/// log-and-fall-back behaviour is assertable in tests instead of going
/// through process-global state.
pub trait Log {
    fn error(&self, msg: &str);
    fn info(&self, msg: &str);
}

/// Production sink, forwards to the tracing subscriber installed in main.
pub struct Tracing;

impl Log for Tracing {
    fn error(&self, msg: &str) {
        tracing::error!("{}", msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!("{}", msg);
    }
}

/// Test sink capturing error lines so both emission and silence are
/// assertable.
#[cfg(test)]
pub struct Recorder {
    errors: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl Recorder {
    pub fn new() -> Recorder {
        Recorder {
            errors: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Log for Recorder {
    fn error(&self, msg: &str) {
        self.errors.lock().unwrap().push(msg.to_string());
    }

    fn info(&self, _msg: &str) {}
}
