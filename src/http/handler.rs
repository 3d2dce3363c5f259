use crate::http::request::Request;
use crate::http::response::Response;

/// Turns a framed request into a response.
///
/// The connection decides keep-alive on its own; a handler only chooses the
/// status and body.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: &Request) -> Response;
}

/// Answers every request with `200 OK` and a fixed greeting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hello;

impl Handler for Hello {
    fn handle(&self, _req: &Request) -> Response {
        Response::hello()
    }
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    fn handle(&self, req: &Request) -> Response {
        self(req)
    }
}
