//! The `TermsInclude` tagged union used by `terms` requests.

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, JsonKind, Member, ObjectCodec, Reader, TaggedUnion, Writer, decode_union};
use crate::error::{BuildError, DecodeError, EncodeError, VariantMismatch};
use crate::model::builder::{SingleUse, require};

/// Which terms a `terms` aggregation considers: a regular expression, an
/// exact list, or one partition of the term space.
#[derive(Debug, Clone, PartialEq)]
pub enum TermsInclude {
    Regexp(String),
    Terms(Vec<String>),
    Partition(TermsPartition),
}

impl TermsInclude {
    pub fn is_regexp(&self) -> bool {
        matches!(self, TermsInclude::Regexp(_))
    }

    pub fn is_terms(&self) -> bool {
        matches!(self, TermsInclude::Terms(_))
    }

    pub fn is_partition(&self) -> bool {
        matches!(self, TermsInclude::Partition(_))
    }

    pub fn regexp(&self) -> Result<&str, VariantMismatch> {
        match self {
            TermsInclude::Regexp(pattern) => Ok(pattern),
            _ => Err(self.mismatch("regexp")),
        }
    }

    pub fn terms(&self) -> Result<&[String], VariantMismatch> {
        match self {
            TermsInclude::Terms(terms) => Ok(terms),
            _ => Err(self.mismatch("terms")),
        }
    }

    pub fn partition(&self) -> Result<&TermsPartition, VariantMismatch> {
        match self {
            TermsInclude::Partition(partition) => Ok(partition),
            _ => Err(self.mismatch("partition")),
        }
    }
}

impl TaggedUnion for TermsInclude {
    const UNION_NAME: &'static str = "TermsInclude";

    fn variant_tag(&self) -> &'static str {
        match self {
            TermsInclude::Regexp(_) => "regexp",
            TermsInclude::Terms(_) => "terms",
            TermsInclude::Partition(_) => "partition",
        }
    }
}

impl Encode for TermsInclude {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        match self {
            TermsInclude::Regexp(pattern) => writer.write_str(pattern),
            TermsInclude::Terms(terms) => writer.write_slice(terms),
            TermsInclude::Partition(partition) => partition.encode(writer),
        }
    }
}

const TERMS_INCLUDE_MEMBERS: &[Member<TermsInclude>] = &[
    Member {
        tag: "regexp",
        accepts: &[JsonKind::String],
        decode: |r| r.read_string().map(TermsInclude::Regexp),
    },
    Member {
        tag: "terms",
        accepts: &[JsonKind::Array],
        decode: |r| r.read_vec(String::decode).map(TermsInclude::Terms),
    },
    Member {
        tag: "partition",
        accepts: &[JsonKind::Object],
        decode: |r| TermsPartition::decode(r).map(TermsInclude::Partition),
    },
];

impl Decode for TermsInclude {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        decode_union(Self::UNION_NAME, TERMS_INCLUDE_MEMBERS, reader)
    }
}

/// Selects partition `partition` of `num_partitions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsPartition {
    num_partitions: i64,
    partition: i64,
}

impl TermsPartition {
    pub fn new(num_partitions: i64, partition: i64) -> Self {
        Self {
            num_partitions,
            partition,
        }
    }

    pub fn num_partitions(&self) -> i64 {
        self.num_partitions
    }

    pub fn partition(&self) -> i64 {
        self.partition
    }
}

/// Builder for [`TermsPartition`].
#[derive(Debug, Clone, Default)]
pub struct TermsPartitionBuilder {
    guard: SingleUse,
    num_partitions: Option<i64>,
    partition: Option<i64>,
}

impl TermsPartitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_partitions(&mut self, value: i64) -> &mut Self {
        self.num_partitions = Some(value);
        self
    }

    pub fn partition(&mut self, value: i64) -> &mut Self {
        self.partition = Some(value);
        self
    }

    pub fn build(&mut self) -> Result<TermsPartition, BuildError> {
        self.guard.consume("TermsPartition")?;
        Ok(TermsPartition {
            num_partitions: require(self.num_partitions.take(), "TermsPartition", "num_partitions")?,
            partition: require(self.partition.take(), "TermsPartition", "partition")?,
        })
    }
}

lazy_static! {
    static ref TERMS_PARTITION_CODEC: ObjectCodec<TermsPartition, TermsPartitionBuilder> = {
        let mut codec = ObjectCodec::new("TermsPartition", TermsPartitionBuilder::new, TermsPartitionBuilder::build);
        codec
            .add(
                "num_partitions",
                |b, r| {
                    b.num_partitions(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_field("num_partitions", &v.num_partitions),
            )
            .add(
                "partition",
                |b, r| {
                    b.partition(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_field("partition", &v.partition),
            );
        codec
    };
}

impl Encode for TermsPartition {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        TERMS_PARTITION_CODEC.encode(self, writer)
    }
}

impl Decode for TermsPartition {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        TERMS_PARTITION_CODEC.decode(reader)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::error::ErrorKind;

    #[test]
    fn test_shapes() {
        let regexp: TermsInclude = decode_value(&json!("err.*")).unwrap();
        assert_eq!(regexp.regexp().unwrap(), "err.*");

        let terms: TermsInclude = decode_value(&json!(["a", "b"])).unwrap();
        assert_eq!(terms.terms().unwrap(), ["a".to_string(), "b".to_string()]);

        let partition: TermsInclude = decode_value(&json!({"num_partitions": 10, "partition": 2})).unwrap();
        assert_eq!(partition.partition().unwrap(), &TermsPartition::new(10, 2));
        assert_eq!(
            encode_value(&partition).unwrap(),
            json!({"num_partitions": 10, "partition": 2})
        );
        assert_eq!(regexp.terms().unwrap_err().kind(), ErrorKind::VariantMismatch);
    }

    #[test]
    fn test_incomplete_partition_reports_missing_field() {
        let err = decode_value::<TermsInclude>(&json!({"partition": 2})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert!(matches!(
            err,
            DecodeError::Build { source: BuildError::MissingRequiredField { field: "num_partitions", .. }, .. }
        ));

        let err = decode_value::<TermsInclude>(&json!(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatchingVariant);
    }
}
