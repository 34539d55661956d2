use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::{Mutex, PoisonError},
};

use anyhow::Context;
use log::{debug, warn};

use crate::Result;

/// The application that owns the input contexts text is committed into
pub trait Host: Send + Sync + 'static {
    /// A handle to one input context
    type Session;

    /// Look up the currently focused input context, if there is one
    fn current_session(&self) -> Option<Self::Session>;

    /// Inject `text` into `session` exactly as given
    fn commit_string(&self, session: &Self::Session, text: &str);
}

/// Stands in for the focused input context of an [`OutputHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focused;

/// A host whose only input context is a byte sink.  Every committed string is
/// written out followed by a terminator.
pub struct OutputHost {
    out: Mutex<Box<dyn Write + Send>>,
    terminator: u8,
    focused: bool,
}

impl fmt::Debug for OutputHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputHost")
            .field("terminator", &self.terminator)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl OutputHost {
    pub fn new(out: impl Write + Send + 'static, zero: bool, focused: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            terminator: if zero { b'\0' } else { b'\n' },
            focused,
        }
    }

    pub fn stdout(zero: bool, focused: bool) -> Self { Self::new(io::stdout(), zero, focused) }

    /// Open `path` for appending, creating it if needed
    pub fn append_to(path: &Path, zero: bool, focused: bool) -> Result<Self> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Error opening {} for output", path.display()))?;

        debug!("Committing text to {}", path.display());

        Ok(Self::new(file, zero, focused))
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        out.write_all(text.as_bytes())?;
        out.write_all(&[self.terminator])?;
        out.flush()
    }
}

impl Host for OutputHost {
    type Session = Focused;

    fn current_session(&self) -> Option<Focused> { self.focused.then_some(Focused) }

    fn commit_string(&self, _: &Focused, text: &str) {
        if let Err(e) = self.write(text) {
            warn!("Error writing committed string: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn test_commit_appends_terminator() {
        let buf = Shared::default();
        let host = OutputHost::new(buf.clone(), false, true);

        let session = host.current_session().unwrap();
        host.commit_string(&session, "hello");
        host.commit_string(&session, "");
        host.commit_string(&session, "héllo wörld ✓");

        assert_eq!(
            String::from_utf8(buf.0.lock().unwrap().clone()).unwrap(),
            "hello\n\nhéllo wörld ✓\n"
        );
    }

    #[test]
    fn test_zero_terminator() {
        let buf = Shared::default();
        let host = OutputHost::new(buf.clone(), true, true);

        host.commit_string(&Focused, "a b");
        host.commit_string(&Focused, "c\nd");

        assert_eq!(*buf.0.lock().unwrap(), b"a b\0c\nd\0");
    }

    #[test]
    fn test_unfocused_has_no_session() {
        let host = OutputHost::new(io::sink(), false, false);
        assert_eq!(host.current_session(), None);

        let host = OutputHost::new(io::sink(), false, true);
        assert_eq!(host.current_session(), Some(Focused));
    }

    #[test]
    fn test_write_errors_are_swallowed() {
        #[derive(Debug)]
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> { Ok(()) }
        }

        let host = OutputHost::new(Broken, false, true);
        host.commit_string(&Focused, "lost");
    }
}
