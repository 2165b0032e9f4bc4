//! Response envelopes and their unwrapping into typed records.
//!
//! The API answers in one of three shapes:
//!
//! - **direct**: the body is the record itself (acknowledgements of
//!   mutating calls, which carry their own `result_ok`)
//! - **wrapped**: `{ "result_ok": true, "data": { ... } }`
//! - **paged**: `{ "result_ok": true, "total_pages": 3, "data": [ ... ] }`
//!
//! [`Shape::unwrap`] turns any of them into a [`Page`] of records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// How a response body is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The body is the payload.
    Direct,
    /// The payload is the `data` field of a single envelope.
    Wrapped,
    /// The payload is the `data` array of a paged envelope.
    Paged,
}

/// Envelope around a single record.
#[derive(Debug, Deserialize)]
pub struct SingleEnvelope<T> {
    /// Whether the service considered the call successful.
    #[serde(default)]
    pub result_ok: bool,
    /// The record, if any.
    pub data: Option<T>,
}

/// Envelope around one page of records.
#[derive(Debug, Deserialize)]
pub struct PagedEnvelope<T> {
    /// Whether the service considered the call successful.
    #[serde(default)]
    pub result_ok: bool,
    /// The records of this page; individual entries may be null.
    pub data: Option<Vec<Option<T>>>,
    /// How many pages the whole result set spans.
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_pages: i64,
    /// How many records the whole result set holds.
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_count: i64,
    /// The page number the server answered for.
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: i64,
    /// The page size the server applied.
    #[serde(default, deserialize_with = "lenient_count")]
    pub results_per_page: i64,
}

/// Records extracted from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Non-null records, in server order.
    pub records: Vec<T>,
    /// The total page count the server reported; `1` for non-paged shapes.
    pub total_pages: i64,
}

/// Why a body could not be turned into a [`Page`].
#[derive(Debug)]
pub enum EnvelopeError {
    /// The body is not JSON of the expected shape.
    Malformed(serde_json::Error),
    /// The envelope declared `result_ok = false` or carried no payload.
    Declined,
}

impl Shape {
    /// Deserializes `body` according to this shape and extracts its records.
    ///
    /// # Examples
    ///
    /// ```
    /// use gizmo_client::envelope::Shape;
    ///
    /// let body = r#"{"result_ok":true,"total_pages":4,"data":[1,null,2]}"#;
    /// let page = Shape::Paged.unwrap::<u32>(body).unwrap();
    ///
    /// assert_eq!(page.records, vec![1, 2]);
    /// assert_eq!(page.total_pages, 4);
    /// ```
    pub fn unwrap<T: DeserializeOwned>(self, body: &str) -> Result<Page<T>, EnvelopeError> {
        match self {
            Shape::Direct => {
                let record = serde_json::from_str::<T>(body).map_err(EnvelopeError::Malformed)?;
                Ok(Page {
                    records: vec![record],
                    total_pages: 1,
                })
            }
            Shape::Wrapped => {
                let envelope = serde_json::from_str::<SingleEnvelope<T>>(body)
                    .map_err(EnvelopeError::Malformed)?;
                match envelope.data {
                    Some(record) if envelope.result_ok => Ok(Page {
                        records: vec![record],
                        total_pages: 1,
                    }),
                    _ => Err(EnvelopeError::Declined),
                }
            }
            Shape::Paged => {
                let envelope = serde_json::from_str::<PagedEnvelope<T>>(body)
                    .map_err(EnvelopeError::Malformed)?;
                match envelope.data {
                    Some(data) if envelope.result_ok => Ok(Page {
                        records: data.into_iter().flatten().collect(),
                        total_pages: envelope.total_pages,
                    }),
                    _ => Err(EnvelopeError::Declined),
                }
            }
        }
    }
}

/// Accepts counts sent either as JSON numbers or as numeric strings.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(i64),
        Text(String),
        Null(Option<()>),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) if s.trim().is_empty() => Ok(0),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Count::Null(_) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: u32,
    }

    #[test]
    fn test_paged_filters_nulls_in_order() {
        let body = r#"{"result_ok":true,"total_pages":2,"data":[null,{"id":3},{"id":1},null,{"id":2}]}"#;

        let page = Shape::Paged.unwrap::<Record>(body).unwrap();

        assert_eq!(
            page.records,
            vec![Record { id: 3 }, Record { id: 1 }, Record { id: 2 }]
        );
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_paged_counts_as_strings() {
        let body = r#"{"result_ok":true,"total_count":"12","page":"1","total_pages":"3","results_per_page":"5","data":[]}"#;

        let envelope: PagedEnvelope<Record> = serde_json::from_str(body).unwrap();

        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.total_count, 12);
        assert_eq!(envelope.results_per_page, 5);
    }

    #[test]
    fn test_paged_declined() {
        let not_ok = r#"{"result_ok":false,"message":"Invalid survey","data":[]}"#;
        let no_data = r#"{"result_ok":true,"total_pages":1}"#;

        assert!(matches!(
            Shape::Paged.unwrap::<Record>(not_ok),
            Err(EnvelopeError::Declined)
        ));
        assert!(matches!(
            Shape::Paged.unwrap::<Record>(no_data),
            Err(EnvelopeError::Declined)
        ));
    }

    #[test]
    fn test_wrapped_extracts_data() {
        let page = Shape::Wrapped
            .unwrap::<Record>(r#"{"result_ok":true,"data":{"id":9}}"#)
            .unwrap();
        assert_eq!(page.records, vec![Record { id: 9 }]);

        assert!(matches!(
            Shape::Wrapped.unwrap::<Record>(r#"{"result_ok":true,"data":null}"#),
            Err(EnvelopeError::Declined)
        ));
    }

    #[test]
    fn test_direct_keeps_body() {
        let page = Shape::Direct.unwrap::<Record>(r#"{"id":4}"#).unwrap();
        assert_eq!(page.records, vec![Record { id: 4 }]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_shape_mismatch_is_malformed() {
        assert!(matches!(
            Shape::Paged.unwrap::<Record>(r#"{"result_ok":true,"data":{"id":1}}"#),
            Err(EnvelopeError::Malformed(_))
        ));
        assert!(matches!(
            Shape::Direct.unwrap::<Record>("<html>busy</html>"),
            Err(EnvelopeError::Malformed(_))
        ));
    }
}
