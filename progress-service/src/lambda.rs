use axum::{body::Body, extract::Request, response::Response, Router};
use lambda_http::{Body as LambdaBody, Error, Request as LambdaRequest, Response as LambdaResponse};
use tower::ServiceExt;

// The Lambda handler function
pub async fn function_handler(
    app: Router,
    event: LambdaRequest,
) -> Result<LambdaResponse<LambdaBody>, Error> {
    tracing::info!(
        "Received Lambda request: method={:?}, path={:?}, query_params={:?}",
        event.method(),
        event.uri().path(),
        event.uri().query()
    );

    // Convert the Lambda event to an HTTP request for Axum
    let (parts, body) = event.into_parts();
    let body = match body {
        LambdaBody::Empty => Body::empty(),
        LambdaBody::Text(text) => Body::from(text),
        LambdaBody::Binary(data) => {
            tracing::debug!("Request body (binary): {} bytes", data.len());
            Body::from(data)
        }
    };

    let response = app.oneshot(Request::from_parts(parts, body)).await?;
    tracing::info!("Router response: status={}", response.status());

    response_to_lambda(response).await
}

/// Converts the Axum response for API Gateway. UTF-8 bodies stay text so the
/// gateway sees `isBase64Encoded: false`.
pub async fn response_to_lambda(response: Response) -> Result<LambdaResponse<LambdaBody>, Error> {
    let (parts, body) = response.into_parts();

    let bytes = axum::body::to_bytes(body, usize::MAX).await?;

    let builder = parts
        .headers
        .iter()
        .fold(LambdaResponse::builder().status(parts.status), |builder, (name, value)| {
            builder.header(name.as_str(), value.as_bytes())
        });

    let body = if bytes.is_empty() {
        LambdaBody::Empty
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => LambdaBody::Text(text),
            Err(err) => LambdaBody::Binary(err.into_bytes()),
        }
    };

    Ok(builder.body(body)?)
}
