//! Bucket aggregation requests.

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, JsonKind, ObjectCodec, Reader, Writer};
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::model::builder::SingleUse;
use crate::model::{Buckets, CalendarInterval, FieldValue, JsonData, SortOrder, TermsInclude};

// =============================================================================
// TERMS
// =============================================================================

/// Request for the most frequent terms of a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsAggregation {
    field: Option<String>,
    size: Option<i32>,
    shard_size: Option<i32>,
    min_doc_count: Option<i32>,
    missing: Option<FieldValue>,
    include: Option<TermsInclude>,
    exclude: Vec<String>,
    order: Vec<(String, SortOrder)>,
}

impl TermsAggregation {
    pub fn builder() -> TermsAggregationBuilder {
        TermsAggregationBuilder::new()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Number of buckets to return.
    pub fn size(&self) -> Option<i32> {
        self.size
    }

    pub fn shard_size(&self) -> Option<i32> {
        self.shard_size
    }

    pub fn min_doc_count(&self) -> Option<i32> {
        self.min_doc_count
    }

    pub fn missing(&self) -> Option<&FieldValue> {
        self.missing.as_ref()
    }

    pub fn include(&self) -> Option<&TermsInclude> {
        self.include.as_ref()
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Sort criteria, most significant first (`_count`, `_key`, or a sub-aggregation path).
    pub fn order(&self) -> &[(String, SortOrder)] {
        &self.order
    }
}

/// Builder for [`TermsAggregation`].
#[derive(Debug, Clone, Default)]
pub struct TermsAggregationBuilder {
    guard: SingleUse,
    value: TermsAggregation,
}

impl TermsAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.value.field = Some(field.into());
        self
    }

    pub fn size(&mut self, size: i32) -> &mut Self {
        self.value.size = Some(size);
        self
    }

    pub fn shard_size(&mut self, size: i32) -> &mut Self {
        self.value.shard_size = Some(size);
        self
    }

    pub fn min_doc_count(&mut self, count: i32) -> &mut Self {
        self.value.min_doc_count = Some(count);
        self
    }

    pub fn missing(&mut self, value: impl Into<FieldValue>) -> &mut Self {
        self.value.missing = Some(value.into());
        self
    }

    pub fn include(&mut self, include: TermsInclude) -> &mut Self {
        self.value.include = Some(include);
        self
    }

    /// Replaces `exclude`.
    pub fn exclude(&mut self, terms: Vec<String>) -> &mut Self {
        self.value.exclude = terms;
        self
    }

    pub fn add_exclude(&mut self, term: impl Into<String>) -> &mut Self {
        self.value.exclude.push(term.into());
        self
    }

    pub fn extend_exclude(&mut self, terms: impl IntoIterator<Item = String>) -> &mut Self {
        self.value.exclude.extend(terms);
        self
    }

    /// Replaces the sort criteria.
    pub fn order(&mut self, order: Vec<(String, SortOrder)>) -> &mut Self {
        self.value.order = order;
        self
    }

    /// Appends one sort criterion.
    pub fn add_order(&mut self, key: impl Into<String>, order: SortOrder) -> &mut Self {
        self.value.order.push((key.into(), order));
        self
    }

    pub fn build(&mut self) -> Result<TermsAggregation, BuildError> {
        self.guard.consume("TermsAggregation")?;
        Ok(std::mem::take(&mut self.value))
    }
}

fn read_order_criteria(builder: &mut TermsAggregationBuilder, reader: &mut Reader<'_>) -> Result<(), DecodeError> {
    reader.read_object(|key, reader| {
        builder.add_order(key, SortOrder::decode(reader)?);
        Ok(())
    })
}

// Accepts `{"_count": "desc"}` as well as `[{"_count": "desc"}, {"_key": "asc"}]`.
fn read_order(builder: &mut TermsAggregationBuilder, reader: &mut Reader<'_>) -> Result<(), DecodeError> {
    if reader.kind() == JsonKind::Array {
        reader.read_array(|reader| read_order_criteria(builder, reader))
    } else {
        read_order_criteria(builder, reader)
    }
}

fn write_order(value: &TermsAggregation, writer: &mut Writer) -> Result<(), EncodeError> {
    if value.order.is_empty() {
        return Ok(());
    }
    writer.key("order")?;
    writer.begin_array()?;
    for (key, order) in &value.order {
        writer.begin_object()?;
        writer.write_field(key, order)?;
        writer.end_object()?;
    }
    writer.end_array()
}

lazy_static! {
    static ref TERMS_AGGREGATION_CODEC: ObjectCodec<TermsAggregation, TermsAggregationBuilder> = {
        let mut codec = ObjectCodec::new("TermsAggregation", TermsAggregationBuilder::new, TermsAggregationBuilder::build);
        codec
            .add(
                "field",
                |b, r| {
                    b.field(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("field", v.field.as_ref()),
            )
            .add(
                "size",
                |b, r| {
                    b.size(r.read_i32()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("size", v.size.as_ref()),
            )
            .add(
                "shard_size",
                |b, r| {
                    b.shard_size(r.read_i32()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("shard_size", v.shard_size.as_ref()),
            )
            .add(
                "min_doc_count",
                |b, r| {
                    b.min_doc_count(r.read_i32()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("min_doc_count", v.min_doc_count.as_ref()),
            )
            .add(
                "missing",
                |b, r| {
                    b.missing(FieldValue::decode(r)?);
                    Ok(())
                },
                |v, w| w.write_optional_field("missing", v.missing.as_ref()),
            )
            .add(
                "include",
                |b, r| {
                    b.include(TermsInclude::decode(r)?);
                    Ok(())
                },
                |v, w| w.write_optional_field("include", v.include.as_ref()),
            )
            .add(
                "exclude",
                |b, r| {
                    b.extend_exclude(r.read_single_or_vec(|r| r.read_string())?);
                    Ok(())
                },
                |v, w| w.write_slice_field("exclude", &v.exclude),
            )
            .add("order", read_order, write_order);
        codec
    };
}

impl Encode for TermsAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        TERMS_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for TermsAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        TERMS_AGGREGATION_CODEC.decode(reader)
    }
}

// =============================================================================
// HISTOGRAM
// =============================================================================

/// Request for fixed-width numeric buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramAggregation {
    field: Option<String>,
    interval: Option<f64>,
    offset: Option<f64>,
    min_doc_count: Option<i32>,
    missing: Option<f64>,
    keyed: Option<bool>,
    format: Option<String>,
}

impl HistogramAggregation {
    pub fn builder() -> HistogramAggregationBuilder {
        HistogramAggregationBuilder::new()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn interval(&self) -> Option<f64> {
        self.interval
    }

    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    pub fn min_doc_count(&self) -> Option<i32> {
        self.min_doc_count
    }

    pub fn missing(&self) -> Option<f64> {
        self.missing
    }

    pub fn keyed(&self) -> Option<bool> {
        self.keyed
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

/// Builder for [`HistogramAggregation`].
#[derive(Debug, Clone, Default)]
pub struct HistogramAggregationBuilder {
    guard: SingleUse,
    value: HistogramAggregation,
}

impl HistogramAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.value.field = Some(field.into());
        self
    }

    pub fn interval(&mut self, interval: f64) -> &mut Self {
        self.value.interval = Some(interval);
        self
    }

    pub fn offset(&mut self, offset: f64) -> &mut Self {
        self.value.offset = Some(offset);
        self
    }

    pub fn min_doc_count(&mut self, count: i32) -> &mut Self {
        self.value.min_doc_count = Some(count);
        self
    }

    pub fn missing(&mut self, value: f64) -> &mut Self {
        self.value.missing = Some(value);
        self
    }

    pub fn keyed(&mut self, keyed: bool) -> &mut Self {
        self.value.keyed = Some(keyed);
        self
    }

    pub fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.value.format = Some(format.into());
        self
    }

    pub fn build(&mut self) -> Result<HistogramAggregation, BuildError> {
        self.guard.consume("HistogramAggregation")?;
        Ok(std::mem::take(&mut self.value))
    }
}

lazy_static! {
    static ref HISTOGRAM_AGGREGATION_CODEC: ObjectCodec<HistogramAggregation, HistogramAggregationBuilder> = {
        let mut codec = ObjectCodec::new(
            "HistogramAggregation",
            HistogramAggregationBuilder::new,
            HistogramAggregationBuilder::build,
        );
        codec
            .add(
                "field",
                |b, r| {
                    b.field(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("field", v.field.as_ref()),
            )
            .add(
                "interval",
                |b, r| {
                    b.interval(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("interval", v.interval.as_ref()),
            )
            .add(
                "offset",
                |b, r| {
                    b.offset(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("offset", v.offset.as_ref()),
            )
            .add(
                "min_doc_count",
                |b, r| {
                    b.min_doc_count(r.read_i32()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("min_doc_count", v.min_doc_count.as_ref()),
            )
            .add(
                "missing",
                |b, r| {
                    b.missing(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("missing", v.missing.as_ref()),
            )
            .add(
                "keyed",
                |b, r| {
                    b.keyed(r.read_bool()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("keyed", v.keyed.as_ref()),
            )
            .add(
                "format",
                |b, r| {
                    b.format(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("format", v.format.as_ref()),
            );
        codec
    };
}

impl Encode for HistogramAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        HISTOGRAM_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for HistogramAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        HISTOGRAM_AGGREGATION_CODEC.decode(reader)
    }
}

// =============================================================================
// DATE HISTOGRAM
// =============================================================================

/// Request for time buckets, by calendar unit or fixed duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateHistogramAggregation {
    field: Option<String>,
    calendar_interval: Option<CalendarInterval>,
    fixed_interval: Option<String>,
    format: Option<String>,
    time_zone: Option<String>,
    offset: Option<String>,
    min_doc_count: Option<i32>,
    keyed: Option<bool>,
}

impl DateHistogramAggregation {
    pub fn builder() -> DateHistogramAggregationBuilder {
        DateHistogramAggregationBuilder::new()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn calendar_interval(&self) -> Option<CalendarInterval> {
        self.calendar_interval
    }

    /// Fixed bucket width in time units (`90m`, `1d`).
    pub fn fixed_interval(&self) -> Option<&str> {
        self.fixed_interval.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    pub fn offset(&self) -> Option<&str> {
        self.offset.as_deref()
    }

    pub fn min_doc_count(&self) -> Option<i32> {
        self.min_doc_count
    }

    pub fn keyed(&self) -> Option<bool> {
        self.keyed
    }
}

/// Builder for [`DateHistogramAggregation`].
#[derive(Debug, Clone, Default)]
pub struct DateHistogramAggregationBuilder {
    guard: SingleUse,
    value: DateHistogramAggregation,
}

impl DateHistogramAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.value.field = Some(field.into());
        self
    }

    pub fn calendar_interval(&mut self, interval: CalendarInterval) -> &mut Self {
        self.value.calendar_interval = Some(interval);
        self
    }

    pub fn fixed_interval(&mut self, interval: impl Into<String>) -> &mut Self {
        self.value.fixed_interval = Some(interval.into());
        self
    }

    pub fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.value.format = Some(format.into());
        self
    }

    pub fn time_zone(&mut self, time_zone: impl Into<String>) -> &mut Self {
        self.value.time_zone = Some(time_zone.into());
        self
    }

    pub fn offset(&mut self, offset: impl Into<String>) -> &mut Self {
        self.value.offset = Some(offset.into());
        self
    }

    pub fn min_doc_count(&mut self, count: i32) -> &mut Self {
        self.value.min_doc_count = Some(count);
        self
    }

    pub fn keyed(&mut self, keyed: bool) -> &mut Self {
        self.value.keyed = Some(keyed);
        self
    }

    pub fn build(&mut self) -> Result<DateHistogramAggregation, BuildError> {
        self.guard.consume("DateHistogramAggregation")?;
        Ok(std::mem::take(&mut self.value))
    }
}

lazy_static! {
    static ref DATE_HISTOGRAM_AGGREGATION_CODEC: ObjectCodec<DateHistogramAggregation, DateHistogramAggregationBuilder> = {
        let mut codec = ObjectCodec::new(
            "DateHistogramAggregation",
            DateHistogramAggregationBuilder::new,
            DateHistogramAggregationBuilder::build,
        );
        codec
            .add(
                "field",
                |b, r| {
                    b.field(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("field", v.field.as_ref()),
            )
            .add(
                "calendar_interval",
                |b, r| {
                    b.calendar_interval(CalendarInterval::decode(r)?);
                    Ok(())
                },
                |v, w| w.write_optional_field("calendar_interval", v.calendar_interval.as_ref()),
            )
            .add(
                "fixed_interval",
                |b, r| {
                    b.fixed_interval(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("fixed_interval", v.fixed_interval.as_ref()),
            )
            .add(
                "format",
                |b, r| {
                    b.format(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("format", v.format.as_ref()),
            )
            .add(
                "time_zone",
                |b, r| {
                    b.time_zone(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("time_zone", v.time_zone.as_ref()),
            )
            .add(
                "offset",
                |b, r| {
                    b.offset(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("offset", v.offset.as_ref()),
            )
            .add(
                "min_doc_count",
                |b, r| {
                    b.min_doc_count(r.read_i32()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("min_doc_count", v.min_doc_count.as_ref()),
            )
            .add(
                "keyed",
                |b, r| {
                    b.keyed(r.read_bool()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("keyed", v.keyed.as_ref()),
            );
        codec
    };
}

impl Encode for DateHistogramAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        DATE_HISTOGRAM_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for DateHistogramAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        DATE_HISTOGRAM_AGGREGATION_CODEC.decode(reader)
    }
}

// =============================================================================
// RANGE
// =============================================================================

/// One `[from, to)` interval of a range request. Either end may be open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationRange {
    key: Option<String>,
    from: Option<f64>,
    to: Option<f64>,
}

impl AggregationRange {
    pub fn new(from: Option<f64>, to: Option<f64>) -> Self {
        Self { key: None, from, to }
    }

    /// Names the bucket (used as the key of keyed results).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn from(&self) -> Option<f64> {
        self.from
    }

    pub fn to(&self) -> Option<f64> {
        self.to
    }
}

/// Builder for [`AggregationRange`].
#[derive(Debug, Clone, Default)]
pub struct AggregationRangeBuilder {
    guard: SingleUse,
    value: AggregationRange,
}

impl AggregationRangeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        self.value.key = Some(key.into());
        self
    }

    pub fn from(&mut self, from: f64) -> &mut Self {
        self.value.from = Some(from);
        self
    }

    pub fn to(&mut self, to: f64) -> &mut Self {
        self.value.to = Some(to);
        self
    }

    pub fn build(&mut self) -> Result<AggregationRange, BuildError> {
        self.guard.consume("AggregationRange")?;
        Ok(std::mem::take(&mut self.value))
    }
}

lazy_static! {
    static ref AGGREGATION_RANGE_CODEC: ObjectCodec<AggregationRange, AggregationRangeBuilder> = {
        let mut codec = ObjectCodec::new("AggregationRange", AggregationRangeBuilder::new, AggregationRangeBuilder::build);
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("key", v.key.as_ref()),
            )
            .add(
                "from",
                |b, r| {
                    if let Some(from) = r.read_nullable(|r| r.read_f64())? {
                        b.from(from);
                    }
                    Ok(())
                },
                |v, w| w.write_optional_field("from", v.from.as_ref()),
            )
            .add(
                "to",
                |b, r| {
                    if let Some(to) = r.read_nullable(|r| r.read_f64())? {
                        b.to(to);
                    }
                    Ok(())
                },
                |v, w| w.write_optional_field("to", v.to.as_ref()),
            );
        codec
    };
}

impl Encode for AggregationRange {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        AGGREGATION_RANGE_CODEC.encode(self, writer)
    }
}

impl Decode for AggregationRange {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        AGGREGATION_RANGE_CODEC.decode(reader)
    }
}

/// Request for buckets over explicit value ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeAggregation {
    field: Option<String>,
    ranges: Vec<AggregationRange>,
    keyed: Option<bool>,
    format: Option<String>,
}

impl RangeAggregation {
    pub fn builder() -> RangeAggregationBuilder {
        RangeAggregationBuilder::new()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn ranges(&self) -> &[AggregationRange] {
        &self.ranges
    }

    pub fn keyed(&self) -> Option<bool> {
        self.keyed
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

/// Builder for [`RangeAggregation`].
#[derive(Debug, Clone, Default)]
pub struct RangeAggregationBuilder {
    guard: SingleUse,
    value: RangeAggregation,
}

impl RangeAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.value.field = Some(field.into());
        self
    }

    /// Replaces `ranges`.
    pub fn ranges(&mut self, ranges: Vec<AggregationRange>) -> &mut Self {
        self.value.ranges = ranges;
        self
    }

    pub fn add_range(&mut self, range: AggregationRange) -> &mut Self {
        self.value.ranges.push(range);
        self
    }

    pub fn extend_ranges(&mut self, ranges: impl IntoIterator<Item = AggregationRange>) -> &mut Self {
        self.value.ranges.extend(ranges);
        self
    }

    pub fn keyed(&mut self, keyed: bool) -> &mut Self {
        self.value.keyed = Some(keyed);
        self
    }

    pub fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.value.format = Some(format.into());
        self
    }

    pub fn build(&mut self) -> Result<RangeAggregation, BuildError> {
        self.guard.consume("RangeAggregation")?;
        Ok(std::mem::take(&mut self.value))
    }
}

lazy_static! {
    static ref RANGE_AGGREGATION_CODEC: ObjectCodec<RangeAggregation, RangeAggregationBuilder> = {
        let mut codec = ObjectCodec::new("RangeAggregation", RangeAggregationBuilder::new, RangeAggregationBuilder::build);
        codec
            .add(
                "field",
                |b, r| {
                    b.field(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("field", v.field.as_ref()),
            )
            .add(
                "ranges",
                |b, r| {
                    b.extend_ranges(r.read_vec(AggregationRange::decode)?);
                    Ok(())
                },
                |v, w| w.write_slice_field("ranges", &v.ranges),
            )
            .add(
                "keyed",
                |b, r| {
                    b.keyed(r.read_bool()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("keyed", v.keyed.as_ref()),
            )
            .add(
                "format",
                |b, r| {
                    b.format(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("format", v.format.as_ref()),
            );
        codec
    };
}

impl Encode for RangeAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        RANGE_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for RangeAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        RANGE_AGGREGATION_CODEC.decode(reader)
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Request for one bucket per filter query; named filters give keyed results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltersAggregation {
    filters: Option<Buckets<JsonData>>,
    other_bucket: Option<bool>,
    other_bucket_key: Option<String>,
    keyed: Option<bool>,
}

impl FiltersAggregation {
    pub fn builder() -> FiltersAggregationBuilder {
        FiltersAggregationBuilder::new()
    }

    pub fn filters(&self) -> Option<&Buckets<JsonData>> {
        self.filters.as_ref()
    }

    /// Whether documents matching no filter get their own bucket.
    pub fn other_bucket(&self) -> Option<bool> {
        self.other_bucket
    }

    pub fn other_bucket_key(&self) -> Option<&str> {
        self.other_bucket_key.as_deref()
    }

    pub fn keyed(&self) -> Option<bool> {
        self.keyed
    }
}

/// Builder for [`FiltersAggregation`].
#[derive(Debug, Clone, Default)]
pub struct FiltersAggregationBuilder {
    guard: SingleUse,
    value: FiltersAggregation,
}

impl FiltersAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&mut self, filters: impl Into<Buckets<JsonData>>) -> &mut Self {
        self.value.filters = Some(filters.into());
        self
    }

    pub fn other_bucket(&mut self, value: bool) -> &mut Self {
        self.value.other_bucket = Some(value);
        self
    }

    pub fn other_bucket_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.value.other_bucket_key = Some(key.into());
        self
    }

    pub fn keyed(&mut self, keyed: bool) -> &mut Self {
        self.value.keyed = Some(keyed);
        self
    }

    pub fn build(&mut self) -> Result<FiltersAggregation, BuildError> {
        self.guard.consume("FiltersAggregation")?;
        Ok(std::mem::take(&mut self.value))
    }
}

lazy_static! {
    static ref FILTERS_AGGREGATION_CODEC: ObjectCodec<FiltersAggregation, FiltersAggregationBuilder> = {
        let mut codec = ObjectCodec::new(
            "FiltersAggregation",
            FiltersAggregationBuilder::new,
            FiltersAggregationBuilder::build,
        );
        codec
            .add(
                "filters",
                |b, r| {
                    b.filters(Buckets::<JsonData>::decode(r)?);
                    Ok(())
                },
                |v, w| w.write_optional_field("filters", v.filters.as_ref()),
            )
            .add(
                "other_bucket",
                |b, r| {
                    b.other_bucket(r.read_bool()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("other_bucket", v.other_bucket.as_ref()),
            )
            .add(
                "other_bucket_key",
                |b, r| {
                    b.other_bucket_key(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("other_bucket_key", v.other_bucket_key.as_ref()),
            )
            .add(
                "keyed",
                |b, r| {
                    b.keyed(r.read_bool()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("keyed", v.keyed.as_ref()),
            );
        codec
    };
}

impl Encode for FiltersAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        FILTERS_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for FiltersAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        FILTERS_AGGREGATION_CODEC.decode(reader)
    }
}

// =============================================================================
// GLOBAL, MISSING
// =============================================================================

/// Request for one bucket holding every document in the search context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalAggregation {}

impl GlobalAggregation {
    pub fn new() -> Self {
        Self {}
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalAggregationBuilder {
    guard: SingleUse,
}

impl GlobalAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self) -> Result<GlobalAggregation, BuildError> {
        self.guard.consume("GlobalAggregation")?;
        Ok(GlobalAggregation {})
    }
}

lazy_static! {
    static ref GLOBAL_AGGREGATION_CODEC: ObjectCodec<GlobalAggregation, GlobalAggregationBuilder> =
        ObjectCodec::new("GlobalAggregation", GlobalAggregationBuilder::new, GlobalAggregationBuilder::build);
}

impl Encode for GlobalAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        GLOBAL_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for GlobalAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        GLOBAL_AGGREGATION_CODEC.decode(reader)
    }
}

/// Request for one bucket of documents lacking `field`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingAggregation {
    field: Option<String>,
    missing: Option<FieldValue>,
}

impl MissingAggregation {
    pub fn builder() -> MissingAggregationBuilder {
        MissingAggregationBuilder::new()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn missing(&self) -> Option<&FieldValue> {
        self.missing.as_ref()
    }
}

/// Builder for [`MissingAggregation`].
#[derive(Debug, Clone, Default)]
pub struct MissingAggregationBuilder {
    guard: SingleUse,
    value: MissingAggregation,
}

impl MissingAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.value.field = Some(field.into());
        self
    }

    pub fn missing(&mut self, value: impl Into<FieldValue>) -> &mut Self {
        self.value.missing = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<MissingAggregation, BuildError> {
        self.guard.consume("MissingAggregation")?;
        Ok(std::mem::take(&mut self.value))
    }
}

lazy_static! {
    static ref MISSING_AGGREGATION_CODEC: ObjectCodec<MissingAggregation, MissingAggregationBuilder> = {
        let mut codec = ObjectCodec::new(
            "MissingAggregation",
            MissingAggregationBuilder::new,
            MissingAggregationBuilder::build,
        );
        codec
            .add(
                "field",
                |b, r| {
                    b.field(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("field", v.field.as_ref()),
            )
            .add(
                "missing",
                |b, r| {
                    b.missing(FieldValue::decode(r)?);
                    Ok(())
                },
                |v, w| w.write_optional_field("missing", v.missing.as_ref()),
            );
        codec
    };
}

impl Encode for MissingAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        MISSING_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for MissingAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        MISSING_AGGREGATION_CODEC.decode(reader)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::error::ErrorKind;

    #[test]
    fn test_terms_round_trip() {
        let input = json!({
            "field": "tags",
            "size": 5,
            "include": "rust.*",
            "exclude": ["spam"],
            "order": [{"_count": "desc"}, {"_key": "asc"}]
        });
        let terms: TermsAggregation = decode_value(&input).unwrap();
        assert_eq!(terms.size(), Some(5));
        assert!(terms.include().unwrap().is_regexp());
        assert_eq!(
            terms.order(),
            &[("_count".to_string(), SortOrder::Desc), ("_key".to_string(), SortOrder::Asc)]
        );
        assert_eq!(encode_value(&terms).unwrap(), input);
    }

    #[test]
    fn test_terms_order_single_object() {
        let terms: TermsAggregation = decode_value(&json!({"order": {"_key": "asc"}})).unwrap();
        assert_eq!(terms.order(), &[("_key".to_string(), SortOrder::Asc)]);
        assert_eq!(
            encode_value(&terms).unwrap(),
            json!({"order": [{"_key": "asc"}]})
        );

        let err = decode_value::<TermsAggregation>(&json!({"order": {"_key": "up"}})).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEnumValue { enum_name: "SortOrder", .. }));
    }

    #[test]
    fn test_date_histogram_calendar_alias() {
        let histogram: DateHistogramAggregation =
            decode_value(&json!({"field": "ts", "calendar_interval": "1M"})).unwrap();
        assert_eq!(histogram.calendar_interval(), Some(CalendarInterval::Month));
        assert_eq!(
            encode_value(&histogram).unwrap(),
            json!({"field": "ts", "calendar_interval": "month"})
        );
    }

    #[test]
    fn test_filters_named_and_anonymous() {
        let named: FiltersAggregation = decode_value(&json!({
            "filters": {"errors": {"term": {"level": "error"}}}
        }))
        .unwrap();
        assert!(named.filters().unwrap().is_keyed());

        let anonymous: FiltersAggregation = decode_value(&json!({
            "filters": [{"term": {"level": "error"}}],
            "other_bucket": true
        }))
        .unwrap();
        assert!(anonymous.filters().unwrap().is_array());
        assert_eq!(anonymous.other_bucket(), Some(true));
    }

    #[test]
    fn test_range_with_open_ends() {
        let range = RangeAggregation::builder()
            .field("price")
            .add_range(AggregationRange::new(None, Some(10.0)))
            .add_range(AggregationRange::new(Some(10.0), None).with_key("pricey"))
            .build()
            .unwrap();
        let value = encode_value(&range).unwrap();
        assert_eq!(
            value,
            json!({"field": "price", "ranges": [{"to": 10}, {"key": "pricey", "from": 10}]})
        );
        assert_eq!(decode_value::<RangeAggregation>(&value).unwrap(), range);
    }

    #[test]
    fn test_global_rejects_fields() {
        assert_eq!(encode_value(&GlobalAggregation::new()).unwrap(), json!({}));
        let err = decode_value::<GlobalAggregation>(&json!({"field": "x"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
    }
}
