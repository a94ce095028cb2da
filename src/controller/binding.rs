use crate::error::ApiError;
use crate::server::Request;
use crate::status::Status;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Why a request value could not be bound to a parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No value was supplied and the type has no empty form
    Missing,
    /// A value was supplied but the type rejected it
    Invalid(String),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Missing => write!(f, "no value supplied"),
            BindError::Invalid(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for BindError {}

/// Types that can be constructed from a value in the request's parameter bag.
///
/// This is the deserialization entry point for endpoint parameters. Primitive
/// implementations accept both native JSON values (from decoded bodies) and strings
/// (from the URL, query string and headers). Richer types implement it themselves,
/// usually through [`from_serde`]:
///
/// ```rust
/// use helmsman::controller::{from_serde, BindError, FromRequestValue};
/// use serde::Deserialize;
/// use serde_json::Value;
///
/// #[derive(Deserialize)]
/// struct Point { x: i64, y: i64 }
///
/// impl FromRequestValue for Point {
///     fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
///         from_serde(value)
///     }
///
///     fn type_name() -> String {
///         "Point".to_string()
///     }
/// }
/// ```
pub trait FromRequestValue: Sized + 'static {
    /// Build the value. `None` means the bag had no entry and no default was declared.
    fn from_request_value(value: Option<&Value>) -> Result<Self, BindError>;

    /// Type name shown in documentation.
    fn type_name() -> String;
}

/// Deserialize any `serde` type from a bag value.
///
/// # Errors
///
/// [`BindError::Missing`] for an absent or null value, [`BindError::Invalid`] when the
/// value does not have the type's shape.
pub fn from_serde<T: DeserializeOwned>(value: Option<&Value>) -> Result<T, BindError> {
    match value {
        None | Some(Value::Null) => Err(BindError::Missing),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| BindError::Invalid(e.to_string())),
    }
}

impl FromRequestValue for String {
    fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
        match value {
            None | Some(Value::Null) => Err(BindError::Missing),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(BindError::Invalid(format!(
                "expected a string, found {}",
                kind(other)
            ))),
        }
    }

    fn type_name() -> String {
        "string".to_string()
    }
}

impl FromRequestValue for bool {
    fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
        match value {
            None | Some(Value::Null) => Err(BindError::Missing),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(false),
            Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(true),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" | "" => Ok(false),
                _ => Err(BindError::Invalid(format!("'{s}' is not a boolean"))),
            },
            Some(other) => Err(BindError::Invalid(format!(
                "expected a boolean, found {}",
                kind(other)
            ))),
        }
    }

    fn type_name() -> String {
        "bool".to_string()
    }
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl FromRequestValue for $ty {
                fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
                    match value {
                        None | Some(Value::Null) => Err(BindError::Missing),
                        Some(Value::Number(n)) => n
                            .as_i64()
                            .and_then(|i| <$ty>::try_from(i).ok())
                            .or_else(|| n.as_u64().and_then(|u| <$ty>::try_from(u).ok()))
                            .ok_or_else(|| {
                                BindError::Invalid(format!("{n} does not fit in {}", stringify!($ty)))
                            }),
                        Some(Value::String(s)) => s.trim().parse::<$ty>().map_err(|e| {
                            BindError::Invalid(format!("'{s}' is not an integer: {e}"))
                        }),
                        Some(other) => Err(BindError::Invalid(format!(
                            "expected an integer, found {}",
                            kind(other)
                        ))),
                    }
                }

                fn type_name() -> String {
                    "int".to_string()
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl FromRequestValue for $ty {
                #[allow(clippy::cast_possible_truncation)]
                fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
                    match value {
                        None | Some(Value::Null) => Err(BindError::Missing),
                        Some(Value::Number(n)) => n
                            .as_f64()
                            .map(|f| f as $ty)
                            .ok_or_else(|| BindError::Invalid(format!("{n} is not a number"))),
                        Some(Value::String(s)) => s.trim().parse::<$ty>().map_err(|e| {
                            BindError::Invalid(format!("'{s}' is not a number: {e}"))
                        }),
                        Some(other) => Err(BindError::Invalid(format!(
                            "expected a number, found {}",
                            kind(other)
                        ))),
                    }
                }

                fn type_name() -> String {
                    "float".to_string()
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl FromRequestValue for Value {
    fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
        value.cloned().ok_or(BindError::Missing)
    }

    fn type_name() -> String {
        "mixed".to_string()
    }
}

impl<T: FromRequestValue> FromRequestValue for Option<T> {
    fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => T::from_request_value(Some(v)).map(Some),
        }
    }

    fn type_name() -> String {
        format!("{}|null", T::type_name())
    }
}

impl<T: FromRequestValue> FromRequestValue for Vec<T> {
    fn from_request_value(value: Option<&Value>) -> Result<Self, BindError> {
        match value {
            None | Some(Value::Null) => Err(BindError::Missing),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| T::from_request_value(Some(item)))
                .collect(),
            // Form-style lists arrive as a single comma-separated string
            Some(Value::String(s)) => s
                .split(',')
                .filter(|part| !part.is_empty())
                .map(|part| T::from_request_value(Some(&Value::String(part.trim().to_string()))))
                .collect(),
            Some(other) => Err(BindError::Invalid(format!(
                "expected a list, found {}",
                kind(other)
            ))),
        }
    }

    fn type_name() -> String {
        format!("{}[]", T::type_name())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A declared endpoint parameter: its name in the bag and an optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub default: Option<Value>,
}

/// Binds declared parameters from a request, one position at a time.
pub struct Binder<'a> {
    request: &'a Request,
    method: &'a str,
    params: &'a [ParamDecl],
}

impl<'a> Binder<'a> {
    /// `method` is the derived method name of the endpoint being bound, used in errors.
    #[must_use]
    pub fn new(request: &'a Request, method: &'a str, params: &'a [ParamDecl]) -> Self {
        Self {
            request,
            method,
            params,
        }
    }

    /// Bind the parameter at `index`.
    ///
    /// The bag value wins; the declared default is used when the bag has none.
    ///
    /// # Errors
    ///
    /// [`ApiError::EndpointInvalid`] when no name was declared for `index`,
    /// [`ApiError::MissingParameter`] when nothing could be bound and the type needs a
    /// value, [`ApiError::DeserializationContractViolation`] when the type rejects it.
    pub fn bind<T: FromRequestValue>(&self, index: usize) -> Result<T, ApiError> {
        let Some(decl) = self.params.get(index) else {
            return Err(ApiError::EndpointInvalid {
                method: self.method.to_string(),
                reason: format!(
                    "argument {} ({}) has no declared parameter name",
                    index + 1,
                    T::type_name()
                ),
            });
        };
        let value = self
            .request
            .parameters()
            .get(&decl.name)
            .or(decl.default.as_ref());

        T::from_request_value(value).map_err(|err| match err {
            BindError::Missing => ApiError::MissingParameter {
                parameter: decl.name.clone(),
            },
            BindError::Invalid(reason) => ApiError::DeserializationContractViolation {
                parameter: decl.name.clone(),
                expected: T::type_name(),
                reason,
            },
        })
    }
}

/// What an endpoint hands back to the router.
///
/// Either a single value, stored by the response under its data key, or an ordered list
/// of named entries merged into the response body. An entry with an empty key is stored
/// under the data key.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    body: ReplyBody,
    status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Data(Value),
    Entries(Vec<(String, Value)>),
}

impl Reply {
    /// A reply holding one value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            body: ReplyBody::Data(value),
            status: None,
        }
    }

    /// A reply holding any serializable value.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be represented as JSON.
    pub fn data<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// An empty reply to be filled with [`Reply::entry`].
    #[must_use]
    pub fn entries() -> Self {
        Self {
            body: ReplyBody::Entries(Vec::new()),
            status: None,
        }
    }

    /// Append a named entry. A data reply is turned into entries, keeping its value under
    /// the empty key.
    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let entry = (key.into(), value.into());
        self.body = match self.body {
            ReplyBody::Entries(mut entries) => {
                entries.push(entry);
                ReplyBody::Entries(entries)
            }
            ReplyBody::Data(existing) => ReplyBody::Entries(vec![(String::new(), existing), entry]),
        };
        self
    }

    /// Override the response status for this reply.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub(crate) fn set_status_if_unset(&mut self, status: Option<Status>) {
        if self.status.is_none() {
            self.status = status;
        }
    }

    #[must_use]
    pub fn body(&self) -> &ReplyBody {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> ReplyBody {
        self.body
    }
}

/// Wrapper returning any `Serialize` value from an endpoint.
#[derive(Debug, Clone)]
pub struct Data<T>(pub T);

/// Conversion of endpoint return values into a [`Reply`].
pub trait IntoReply {
    /// # Errors
    ///
    /// Fails if the value cannot be serialized.
    fn into_reply(self) -> anyhow::Result<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(self)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(Reply::new(self))
    }
}

impl IntoReply for () {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(Reply::new(Value::Null))
    }
}

impl IntoReply for Vec<(String, Value)> {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(Reply {
            body: ReplyBody::Entries(self),
            status: None,
        })
    }
}

impl<T: Serialize> IntoReply for Data<T> {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Reply::data(&self.0)
    }
}

macro_rules! impl_into_reply_via_value {
    ($($ty:ty),*) => {
        $(
            impl IntoReply for $ty {
                fn into_reply(self) -> anyhow::Result<Reply> {
                    Ok(Reply::new(Value::from(self)))
                }
            }
        )*
    };
}

impl_into_reply_via_value!(String, &'static str, bool, i32, i64, u32, u64, f64);

/// Endpoint functions whose arguments are bound from the parameter bag.
///
/// Implemented for closures and functions of up to eight arguments, each implementing
/// [`FromRequestValue`], returning `anyhow::Result<R>` with `R: IntoReply`. Arguments
/// are matched positionally with the names declared on the endpoint.
pub trait Handler<Args>: 'static {
    /// Documentation type names of the arguments, in order.
    fn parameter_types(&self) -> Vec<String>;

    /// Bind every argument and invoke.
    ///
    /// # Errors
    ///
    /// Binding failures and any error the function returns.
    fn call(&self, binder: &Binder<'_>) -> anyhow::Result<Reply>;
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> anyhow::Result<R> + 'static,
            R: IntoReply,
            $($ty: FromRequestValue,)*
        {
            fn parameter_types(&self) -> Vec<String> {
                vec![$($ty::type_name()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn call(&self, binder: &Binder<'_>) -> anyhow::Result<Reply> {
                let mut index = 0;
                $(
                    let $ty = binder.bind::<$ty>(index)?;
                    index += 1;
                )*
                (self)($($ty),*)?.into_reply()
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);
