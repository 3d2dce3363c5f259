use bytes::Bytes;

/// Body sent by the default handler.
pub const HELLO_BODY: &str = "Hello from MeServer\n";

/// HTTP status codes a response can carry.
///
/// The connection core only ever produces `Ok`, `BadRequest` and
/// `RequestHeaderFieldsTooLarge`; handlers may also answer `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 431 Request Header Fields Too Large
    RequestHeaderFieldsTooLarge,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use meserver::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::RequestHeaderFieldsTooLarge.as_u16(), 431);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::RequestHeaderFieldsTooLarge => 431,
        }
    }

    /// Returns the standard reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
        }
    }
}

/// A response ready to be written: a status and a body.
///
/// `Connection` and `Content-Length` are derived at write time, no other
/// headers are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::Ok).with_body(body)
    }

    /// The fixed greeting answered to every well-formed request by default.
    pub fn hello() -> Self {
        Self::ok(HELLO_BODY)
    }

    /// Empty-bodied response for a status produced by a framing failure.
    pub fn error(status: StatusCode) -> Self {
        Self::new(status)
    }
}
