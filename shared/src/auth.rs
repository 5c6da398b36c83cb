use lambda_http::http::header::{HeaderValue, CONTENT_TYPE};
use lambda_http::http::StatusCode;
use lambda_http::request::RequestContext;
use lambda_http::{Body, Request, RequestExt, Response};

/// The authenticated principal as supplied by the API Gateway JWT authorizer.
/// Token validation happens upstream; by the time a request reaches the
/// function the claims are trusted.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// OIDC subject, the stable external identity key.
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Pull the authorizer claims out of the request context.
/// No claims (or an empty subject) means no authenticated principal: 401.
pub fn authenticate(event: &Request) -> Result<AuthContext, Response<Body>> {
    let claims = match event.request_context_ref() {
        Some(RequestContext::ApiGatewayV2(ctx)) => ctx
            .authorizer
            .as_ref()
            .and_then(|authorizer| authorizer.jwt.as_ref())
            .map(|jwt| &jwt.claims),
        _ => None,
    };

    let Some(claims) = claims else {
        return Err(unauthorized());
    };

    match claims.get("sub").filter(|sub| !sub.is_empty()) {
        Some(subject) => Ok(AuthContext {
            subject: subject.clone(),
            email: claims.get("email").cloned(),
            name: claims.get("name").cloned(),
            picture: claims.get("picture").cloned(),
        }),
        None => Err(unauthorized()),
    }
}

fn unauthorized() -> Response<Body> {
    let mut resp = Response::new(Body::from(r#"{"error":"Unauthorized"}"#));
    *resp.status_mut() = StatusCode::UNAUTHORIZED;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp.headers_mut().insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    resp
}
