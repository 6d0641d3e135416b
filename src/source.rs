use std::fmt;
use std::sync::mpsc::Sender;

/// Sequence number of one candidate request.
///
/// Issued in increasing order; a response is only applied while its id is
/// still the session's current id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A provider's answer to a request.
#[derive(Debug)]
pub struct Response<T> {
    pub request: RequestId,
    pub outcome: Result<Vec<T>, String>,
}

/// One-shot handle a provider uses to deliver candidates.
///
/// May be used immediately (synchronous providers) or moved elsewhere and
/// used later. Dropping it without answering leaves the session loading.
pub struct Responder<T> {
    request: RequestId,
    tx: Sender<Response<T>>,
}

impl<T> Responder<T> {
    pub fn new(request: RequestId, tx: Sender<Response<T>>) -> Self {
        Self { request, tx }
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn resolve(self, items: Vec<T>) {
        self.send(Ok(items));
    }

    /// Report a provider-side failure. Surfaces as no-match, never as an error.
    pub fn fail(self, reason: impl Into<String>) {
        self.send(Err(reason.into()));
    }

    fn send(self, outcome: Result<Vec<T>, String>) {
        let request = self.request;
        if self.tx.send(Response { request, outcome }).is_err() {
            tracing::debug!("response {request} dropped: controller is gone");
        }
    }
}

/// Produces candidates for a query, possibly asynchronously.
pub trait CandidateProvider<T> {
    fn resolve(&mut self, query: &str, responder: Responder<T>);
}

/// Closure-backed provider.
pub struct FnProvider<F> {
    f: F,
}

impl<F> FnProvider<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> CandidateProvider<T> for FnProvider<F>
where
    F: FnMut(&str, Responder<T>),
{
    fn resolve(&mut self, query: &str, responder: Responder<T>) {
        (self.f)(query, responder)
    }
}

/// Where a collection's candidates come from.
pub enum CandidateSource<T> {
    /// Already materialised list; may be appended to.
    Static(Vec<T>),
    Provider(Box<dyn CandidateProvider<T>>),
}

impl<T> CandidateSource<T> {
    pub fn provider<P>(provider: P) -> Self
    where
        P: CandidateProvider<T> + 'static,
    {
        Self::Provider(Box::new(provider))
    }

    /// Shorthand for a closure provider.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&str, Responder<T>) + 'static,
        T: 'static,
    {
        Self::Provider(Box::new(FnProvider::new(f)))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    pub fn values(&self) -> Option<&[T]> {
        match self {
            Self::Static(values) => Some(values),
            Self::Provider(_) => None,
        }
    }
}

impl<T> From<Vec<T>> for CandidateSource<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Static(values)
    }
}

impl<T: fmt::Debug> fmt::Debug for CandidateSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn responder_delivers_tagged_response() {
        let (tx, rx) = channel();
        let mut source: CandidateSource<String> =
            CandidateSource::from_fn(|query: &str, responder: Responder<String>| {
                responder.resolve(vec![format!("{query}!")]);
            });
        let CandidateSource::Provider(provider) = &mut source else {
            panic!("expected provider");
        };
        provider.resolve("hi", Responder::new(RequestId(7), tx));

        let response = rx.try_recv().unwrap();
        assert_eq!(response.request, RequestId(7));
        assert_eq!(response.outcome, Ok(vec!["hi!".to_string()]));
    }

    #[test]
    fn failure_is_reported_as_outcome() {
        let (tx, rx) = channel::<Response<String>>();
        Responder::new(RequestId(1), tx).fail("backend down");
        assert_eq!(rx.try_recv().unwrap().outcome, Err("backend down".into()));
    }
}
