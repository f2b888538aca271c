//! ROA-style signing: the signature covers selected headers and the resource
//! and travels in the `Authorization` header.

use super::{content_md5, format_rfc1123, percent_encode, prepare, SigningContext, Signer};
use crate::credentials::Credential;
use crate::error::{AcsError, SigningError};
use crate::request::ResolvedRequest;
use crate::transport::HttpRequest;
use std::collections::{BTreeMap, HashMap};

const ACS_HEADER_PREFIX: &str = "x-acs-";

/// Replace `[Name]` placeholders in a URI pattern with path parameters.
pub fn fill_uri_pattern(
    pattern: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, SigningError> {
    let mut path = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find('[') {
        let Some(len) = rest[start..].find(']') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = params
            .get(name)
            .ok_or_else(|| SigningError::MissingPathParameter {
                name: name.to_string(),
                pattern: pattern.to_string(),
            })?;

        path.push_str(&rest[..start]);
        path.push_str(value);
        rest = &rest[start + len + 1..];
    }

    path.push_str(rest);
    Ok(path)
}

/// Lower-cased `x-acs-*` headers, sorted, one `name:value\n` line each.
pub fn canonicalized_headers(headers: &HashMap<String, String>) -> String {
    let acs: BTreeMap<String, &str> = headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.as_str()))
        .filter(|(k, _)| k.starts_with(ACS_HEADER_PREFIX))
        .collect();

    acs.iter().map(|(k, v)| format!("{}:{}\n", k, v)).collect()
}

/// The path, followed by the sorted, unencoded query when there is one.
pub fn canonicalized_resource(path: &str, query: &BTreeMap<String, String>) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let pairs: Vec<String> = query
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                k.clone()
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect();

    format!("{}?{}", path, pairs.join("&"))
}

/// Build the ROA string to sign.
///
/// Format:
/// ```text
/// METHOD\n
/// Accept\n
/// Content-MD5\n
/// Content-Type\n
/// Date\n
/// CanonicalizedHeaders
/// CanonicalizedResource
/// ```
pub fn roa_string_to_sign(method: &str, headers: &HashMap<String, String>, resource: &str) -> String {
    let header = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    };

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}{}",
        method,
        header("Accept"),
        header("Content-MD5"),
        header("Content-Type"),
        header("Date"),
        canonicalized_headers(headers),
        resource
    )
}

pub(super) fn sign(
    resolved: &ResolvedRequest<'_>,
    uri_pattern: &str,
    signer: &dyn Signer,
    credential: &Credential,
    ctx: &SigningContext,
) -> Result<HttpRequest, AcsError> {
    let request = resolved.request;
    let path = fill_uri_pattern(uri_pattern, request.path_params())?;
    let query = request.query_params();

    let mut url = format!("{}://{}{}", request.protocol().scheme(), resolved.domain, path);
    if !query.is_empty() {
        let encoded: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect();
        url.push('?');
        url.push_str(&encoded.join("&"));
    }

    let mut http = prepare(resolved, url);
    if let Some(body) = &http.body {
        let md5 = content_md5(body);
        http.set_header("Content-MD5", md5);
    }

    let mut put = |name: &str, value: &str| http.set_header(name, value);
    put("Date", &format_rfc1123(&ctx.timestamp));
    put("x-acs-signature-method", signer.name());
    put("x-acs-signature-version", signer.version());
    put("x-acs-signature-nonce", &ctx.nonce);
    put("x-acs-region-id", &resolved.region_id);
    put("x-acs-version", request.version());
    if let Some(signature_type) = signer.signer_type() {
        put("x-acs-signature-type", signature_type);
    }
    if let Some(token) = credential.security_token() {
        put("x-acs-security-token", token);
    }
    if let Some(token) = credential.bearer_token_value() {
        put("x-acs-bearer-token", token);
    }

    if let Some(access_key_id) = credential.access_key_id() {
        let resource = canonicalized_resource(&path, query);
        let string_to_sign = roa_string_to_sign(resolved.method.as_str(), &http.headers, &resource);
        let secret = credential.access_key_secret().unwrap_or_default();
        let signature = signer.sign(&string_to_sign, secret)?;
        http.set_header("Authorization", format!("acs {}:{}", access_key_id, signature));
    }

    Ok(http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AcsRequest;
    use crate::signing::{BearerTokenSigner, HmacSha1Signer};
    use crate::types::{Format, HttpMethod};
    use chrono::{TimeZone, Utc};

    fn context() -> SigningContext {
        SigningContext::new(
            Utc.with_ymd_and_hms(2016, 2, 23, 12, 46, 24).unwrap(),
            "nonce-1",
        )
    }

    fn resolve(request: &AcsRequest, method: HttpMethod) -> ResolvedRequest<'_> {
        ResolvedRequest {
            request,
            method,
            region_id: "cn-hangzhou".to_string(),
            format: Format::Json,
            domain: "cs.aliyuncs.com".to_string(),
        }
    }

    #[test]
    fn test_fill_uri_pattern() {
        let mut params = BTreeMap::new();
        params.insert("ClusterId".to_string(), "c-1".to_string());
        params.insert("NodeId".to_string(), "n-2".to_string());

        assert_eq!(
            fill_uri_pattern("/clusters/[ClusterId]/nodes/[NodeId]", &params).unwrap(),
            "/clusters/c-1/nodes/n-2"
        );
        assert_eq!(fill_uri_pattern("/regions", &params).unwrap(), "/regions");
    }

    #[test]
    fn test_fill_uri_pattern_missing_parameter() {
        let result = fill_uri_pattern("/clusters/[ClusterId]", &BTreeMap::new());
        assert!(matches!(
            result,
            Err(SigningError::MissingPathParameter { ref name, .. }) if name == "ClusterId"
        ));
    }

    #[test]
    fn test_canonicalized_headers() {
        let mut headers = HashMap::new();
        headers.insert("X-Acs-Version".to_string(), "2015-12-15".to_string());
        headers.insert("x-acs-region-id".to_string(), "cn-hangzhou".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        assert_eq!(
            canonicalized_headers(&headers),
            "x-acs-region-id:cn-hangzhou\nx-acs-version:2015-12-15\n"
        );
    }

    #[test]
    fn test_canonicalized_resource() {
        let mut query = BTreeMap::new();
        assert_eq!(canonicalized_resource("/clusters", &query), "/clusters");

        query.insert("b".to_string(), "2".to_string());
        query.insert("a".to_string(), String::new());
        assert_eq!(canonicalized_resource("/clusters", &query), "/clusters?a&b=2");
    }

    #[test]
    fn test_sign_get_request() {
        let request = AcsRequest::roa("CS", "2015-12-15", "DescribeClusterDetail", "/clusters/[ClusterId]")
            .with_path_param("ClusterId", "c-1")
            .with_query_param("Detail", "true");
        let credential = Credential::access_key("id", "secret");

        let http = sign(
            &resolve(&request, HttpMethod::Get),
            "/clusters/[ClusterId]",
            &HmacSha1Signer,
            &credential,
            &context(),
        )
        .unwrap();

        assert_eq!(http.url, "https://cs.aliyuncs.com/clusters/c-1?Detail=true");
        assert_eq!(http.get_header("Date"), Some("Tue, 23 Feb 2016 12:46:24 GMT"));
        assert_eq!(http.get_header("x-acs-signature-nonce"), Some("nonce-1"));
        assert!(http.get_header("Content-MD5").is_none());

        let expected = "GET\napplication/json\n\napplication/json\nTue, 23 Feb 2016 12:46:24 GMT\n\
                        x-acs-region-id:cn-hangzhou\n\
                        x-acs-signature-method:HMAC-SHA1\n\
                        x-acs-signature-nonce:nonce-1\n\
                        x-acs-signature-version:1.0\n\
                        x-acs-version:2015-12-15\n\
                        /clusters/c-1?Detail=true";
        let signature = HmacSha1Signer.sign(expected, "secret").unwrap();

        assert_eq!(
            http.get_header("Authorization").map(str::to_string),
            Some(format!("acs id:{}", signature))
        );
    }

    #[test]
    fn test_caller_headers_in_other_case_are_replaced() {
        let request = AcsRequest::roa("CS", "2015-12-15", "DescribeClusters", "/clusters")
            .with_header("accept", "application/xml")
            .with_header("X-Acs-Version", "1999-01-01")
            .with_header("X-Acs-Trace-Id", "t-1");
        let credential = Credential::access_key("id", "secret");

        for _ in 0..20 {
            let http = sign(
                &resolve(&request, HttpMethod::Get),
                "/clusters",
                &HmacSha1Signer,
                &credential,
                &context(),
            )
            .unwrap();

            let accept_keys = http
                .headers
                .keys()
                .filter(|k| k.eq_ignore_ascii_case("accept"))
                .count();
            assert_eq!(accept_keys, 1);
            assert_eq!(http.get_header("Accept"), Some("application/json"));
            assert_eq!(http.get_header("x-acs-version"), Some("2015-12-15"));

            let expected = "GET\napplication/json\n\napplication/json\nTue, 23 Feb 2016 12:46:24 GMT\n\
                            x-acs-region-id:cn-hangzhou\n\
                            x-acs-signature-method:HMAC-SHA1\n\
                            x-acs-signature-nonce:nonce-1\n\
                            x-acs-signature-version:1.0\n\
                            x-acs-trace-id:t-1\n\
                            x-acs-version:2015-12-15\n\
                            /clusters";
            let signature = HmacSha1Signer.sign(expected, "secret").unwrap();
            assert_eq!(
                http.get_header("Authorization").map(str::to_string),
                Some(format!("acs id:{}", signature))
            );
        }
    }

    #[test]
    fn test_sign_request_with_content() {
        let request = AcsRequest::roa("CS", "2015-12-15", "CreateCluster", "/clusters")
            .with_content(r#"{"Name":"demo"}"#, "application/json");
        let credential = Credential::sts_token("id", "secret", "token");

        let http = sign(
            &resolve(&request, HttpMethod::Post),
            "/clusters",
            &HmacSha1Signer,
            &credential,
            &context(),
        )
        .unwrap();

        assert_eq!(http.get_header("Content-MD5"), Some("UqxmoMHDBVhyAXxJ7VVV4Q=="));
        assert_eq!(http.get_header("Content-Type"), Some("application/json"));
        assert_eq!(http.get_header("x-acs-security-token"), Some("token"));
        assert!(http.get_header("Authorization").is_some());
    }

    #[test]
    fn test_bearer_token_request() {
        let request = AcsRequest::roa("CS", "2015-12-15", "DescribeClusters", "/clusters");
        let credential = Credential::bearer_token("bearer");

        let http = sign(
            &resolve(&request, HttpMethod::Get),
            "/clusters",
            &BearerTokenSigner,
            &credential,
            &context(),
        )
        .unwrap();

        assert_eq!(http.get_header("x-acs-bearer-token"), Some("bearer"));
        assert_eq!(http.get_header("x-acs-signature-type"), Some("BEARERTOKEN"));
        assert!(http.get_header("Authorization").is_none());
    }
}
