#![allow(dead_code)]

pub mod fixtures {
    use helmsman::controller::{Controller, Endpoint, Reply};
    use helmsman::{ApiError, Status};
    use http::Method;
    use serde_json::{json, Value};

    /// Root controller with an `information` endpoint and a `child` controller.
    pub fn root() -> Controller {
        Controller::builder()
            .named("root")
            .endpoint(
                Method::GET,
                "information",
                Endpoint::new(|| -> anyhow::Result<&'static str> { Ok("information") })
                    .doc("/**\n * Returns some information.\n * @return string\n */"),
            )
            .endpoint(
                Method::GET,
                "secret",
                Endpoint::new(|| -> anyhow::Result<&'static str> { Ok("hidden but here") }),
            )
            .endpoint(
                Method::GET,
                "teapot",
                Endpoint::new(|| -> anyhow::Result<Reply> {
                    Ok(Reply::new(json!("short and stout")).with_status(Status::new(418)?))
                }),
            )
            .endpoint(
                Method::GET,
                "explode",
                Endpoint::new(|| -> anyhow::Result<()> {
                    Err(anyhow::anyhow!("connection to 10.0.0.7 refused"))
                }),
            )
            .endpoint(
                Method::GET,
                "forbidden",
                Endpoint::new(|| -> anyhow::Result<()> {
                    Err(ApiError::new(Status::new(403)?, "You may not look at this")
                        .with_internal("user 17 lacks the audit role")
                        .into())
                }),
            )
            .endpoint(
                Method::GET,
                "echo",
                Endpoint::new(|id: String| -> anyhow::Result<String> { Ok(id) }).param("id"),
            )
            .hide("getSecretEndpoint")
            .child("child", child)
            .build()
    }

    pub fn child() -> Controller {
        Controller::builder()
            .named("child")
            .endpoint(
                Method::POST,
                "complex-data",
                Endpoint::new(|param1: String, param2: i64| -> anyhow::Result<Value> {
                    Ok(json!({ "param1": param1, "param2": param2 }))
                })
                .param("param1")
                .param("param2")
                .doc(
                    "/**\n * Echoes both parameters.\n *\n * @param string $param1 First\n * @param int $param2 Second\n * @return array\n */",
                ),
            )
            .endpoint(
                Method::GET,
                "parts",
                Endpoint::new(|| -> anyhow::Result<Reply> {
                    Ok(Reply::entries()
                        .entry("first", 1)
                        .entry("", "main")
                        .entry("second", json!({ "nested": true })))
                }),
            )
            .build()
    }
}

pub mod http_text {
    /// A raw HTTP response split into its parts.
    pub struct RawResponse {
        pub status_line: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RawResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    pub fn parse(bytes: &[u8]) -> RawResponse {
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap().to_string();
        let headers = lines
            .map(|line| {
                let (name, value) = line.split_once(':').unwrap();
                (name.trim().to_string(), value.trim().to_string())
            })
            .collect();
        RawResponse {
            status_line,
            headers,
            body: body.to_string(),
        }
    }
}
