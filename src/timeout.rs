use std::{future::Future, time::Duration};

use tokio::time;

#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("No reply within {0:?}")]
    Elapsed(Duration),
    #[error("{0}")]
    Other(#[source] E),
}

/// A value whose every use is bounded by the same deadline
#[derive(Debug, Clone)]
pub struct Timeout<T> {
    inner: T,
    limit: Duration,
}

impl<T> Timeout<T> {
    pub fn new(inner: T, limit: Duration) -> Self { Self { inner, limit } }

    #[inline]
    pub fn limit(&self) -> Duration { self.limit }

    #[inline]
    pub async fn run<'a, F: FnOnce(&'a T) -> FR, FR: Future + 'a>(
        &'a self,
        f: F,
    ) -> Result<FR::Output, time::error::Elapsed>
    where
        T: 'a,
    {
        time::timeout(self.limit, f(&self.inner)).await
    }

    #[inline]
    pub async fn try_run<'a, F: FnOnce(&'a T) -> FR, FR: Future<Output = Result<R, E>> + 'a, R, E>(
        &'a self,
        f: F,
    ) -> Result<R, Error<E>>
    where
        T: 'a,
    {
        self.run(f)
            .await
            .map_err(|_| Error::Elapsed(self.limit))?
            .map_err(Error::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_try_run_ok() {
        let t = Timeout::new(5_u32, Duration::from_secs(1));

        let res = t.try_run(|n| async move { Ok::<_, ()>(*n + 1) }).await;
        assert!(matches!(res, Ok(6)));
    }

    #[tokio::test]
    async fn test_try_run_inner_error() {
        let t = Timeout::new((), Duration::from_secs(1));

        let res = t.try_run(|()| async { Err::<(), _>("nope") }).await;
        assert!(matches!(res, Err(Error::Other("nope"))));
    }

    #[tokio::test]
    async fn test_try_run_elapsed() {
        let t = Timeout::new((), Duration::from_millis(10));

        let res = t
            .try_run(|()| async {
                time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ()>(())
            })
            .await;

        assert!(matches!(res, Err(Error::Elapsed(d)) if d == t.limit()));
    }
}
