//! The application side of the calling convention.

use gatebridge_core::Environment;

use crate::body::Body;
use crate::state::StartResponse;

/// A request-handling application.
///
/// During [`call`](Application::call) the application must invoke
/// `start.start_response(..)` at least once, then return a lazy body. The
/// body is drained by the bridge after `call` returns.
pub trait Application {
    type Body: Body;

    fn call(
        &self,
        environ: &Environment,
        start: &mut StartResponse<'_>,
    ) -> anyhow::Result<Self::Body>;
}

impl<A: Application + ?Sized> Application for &A {
    type Body = A::Body;

    fn call(
        &self,
        environ: &Environment,
        start: &mut StartResponse<'_>,
    ) -> anyhow::Result<Self::Body> {
        (**self).call(environ, start)
    }
}

impl<A: Application + ?Sized> Application for std::sync::Arc<A> {
    type Body = A::Body;

    fn call(
        &self,
        environ: &Environment,
        start: &mut StartResponse<'_>,
    ) -> anyhow::Result<Self::Body> {
        (**self).call(environ, start)
    }
}

/// An [`Application`] backed by a closure. Built with [`app_fn`].
#[derive(Clone, Copy)]
pub struct AppFn<F> {
    f: F,
}

/// Turn a closure into an [`Application`].
///
/// ```
/// use gatebridge::{app_fn, iter_body, Environment, ResponseBridge};
///
/// let app = app_fn(|_environ, start| {
///     start.start_response("200 OK", [("Content-Type", "text/plain")], None)?;
///     Ok(iter_body(["ok"]))
/// });
///
/// let response = ResponseBridge::new().invoke(&Environment::new(), &app).unwrap();
/// assert_eq!(response, "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nok");
/// ```
pub fn app_fn<F, B>(f: F) -> AppFn<F>
where
    F: Fn(&Environment, &mut StartResponse<'_>) -> anyhow::Result<B>,
    B: Body,
{
    AppFn { f }
}

impl<F, B> Application for AppFn<F>
where
    F: Fn(&Environment, &mut StartResponse<'_>) -> anyhow::Result<B>,
    B: Body,
{
    type Body = B;

    fn call(
        &self,
        environ: &Environment,
        start: &mut StartResponse<'_>,
    ) -> anyhow::Result<B> {
        (self.f)(environ, start)
    }
}

impl<F> std::fmt::Debug for AppFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppFn").finish_non_exhaustive()
    }
}
