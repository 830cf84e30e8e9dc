//! Form state for a trip request.
//!
//! Every edit goes through [`reduce`], which returns a fresh [`FormState`]
//! and never mutates its input. Derived fields (`days`) are recomputed
//! synchronously after each accepted edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TripRequest;

pub const DATE_ORDER_ERROR: &str = "Return date must be after departure date.";
pub const MAX_CHILD_AGE: u8 = 17;
pub const MAX_CHILDREN: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field: {0}")] UnknownField(String),
    #[error("field is not directly editable: {0}")] ReadOnlyField(String),
    #[error("child index {index} out of range (num_children = {len})")]
    ChildIndexOutOfRange { index: usize, len: usize },
    #[error("too many children: {0} (max {})", MAX_CHILDREN)] TooManyChildren(u32),
}

/// Why a form cannot be submitted yet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("From city and to city are required.")] MissingCity,
    #[error("At least one adult must be traveling.")] NoAdults,
    #[error("{0} is required.")] MissingDate(&'static str),
    #[error("{field} is not a valid YYYY-MM-DD date: {value}")] BadDate { field: &'static str, value: String },
    #[error("{}", DATE_ORDER_ERROR)] DateOrder,
}

/// Fields editable through [`update_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FromCity,
    ToCity,
    DepartureDate,
    ReturnDate,
    NumAdults,
    NumChildren,
    MinPrice,
    MaxPrice,
    Budget,
    FromStation,
    ToStation,
}

impl Field {
    pub fn parse(name: &str) -> Result<Self, FormError> {
        Ok(match name {
            "from_city" => Field::FromCity,
            "to_city" => Field::ToCity,
            "departure_date" => Field::DepartureDate,
            "return_date" => Field::ReturnDate,
            "num_adults" => Field::NumAdults,
            "num_children" => Field::NumChildren,
            "min_price" => Field::MinPrice,
            "max_price" => Field::MaxPrice,
            "budget" => Field::Budget,
            "from_station" => Field::FromStation,
            "to_station" => Field::ToStation,
            "days" | "children_ages" => return Err(FormError::ReadOnlyField(name.to_string())),
            other => return Err(FormError::UnknownField(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    Field { name: String, value: String },
    ChildCount { value: String },
    ChildAge { index: usize, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub request: TripRequest,
    /// Advisory only; editing continues while it is set.
    pub validation_error: Option<String>,
}

impl FormState {
    pub fn new() -> Self { Self::default() }

    /// Checks everything the itinerary service needs before a request is sent.
    pub fn check_submittable(&self) -> Result<(), InvalidRequest> {
        let r = &self.request;
        if r.from_city.trim().is_empty() || r.to_city.trim().is_empty() {
            return Err(InvalidRequest::MissingCity);
        }
        if r.num_adults == 0 {
            return Err(InvalidRequest::NoAdults);
        }
        let departure = required_date("departure_date", &r.departure_date)?;
        let ret = required_date("return_date", &r.return_date)?;
        if ret < departure {
            return Err(InvalidRequest::DateOrder);
        }
        Ok(())
    }
}

fn required_date(field: &'static str, raw: &str) -> Result<NaiveDate, InvalidRequest> {
    if raw.trim().is_empty() {
        return Err(InvalidRequest::MissingDate(field));
    }
    parse_date(raw).ok_or_else(|| InvalidRequest::BadDate { field, value: raw.to_string() })
}

pub fn reduce(state: &FormState, event: FormEvent) -> Result<FormState, FormError> {
    match event {
        FormEvent::Field { name, value } => update_field(state, &name, &value),
        FormEvent::ChildCount { value } => update_child_count(state, &value),
        FormEvent::ChildAge { index, value } => update_child_age(state, index, &value),
    }
}

pub fn update_field(state: &FormState, name: &str, raw: &str) -> Result<FormState, FormError> {
    let field = Field::parse(name)?;
    let mut next = state.clone();
    let r = &mut next.request;
    match field {
        Field::FromCity => r.from_city = raw.to_string(),
        Field::ToCity => r.to_city = raw.to_string(),
        Field::DepartureDate => r.departure_date = raw.to_string(),
        Field::ReturnDate => r.return_date = raw.to_string(),
        Field::FromStation => r.from_station = raw.to_string(),
        Field::ToStation => r.to_station = raw.to_string(),
        Field::NumAdults => r.num_adults = saturate_u32(parse_int(raw)),
        Field::MinPrice => r.min_price = saturate_u64(parse_int(raw)),
        Field::MaxPrice => r.max_price = saturate_u64(parse_int(raw)),
        Field::Budget => r.budget = saturate_u64(parse_int(raw)),
        Field::NumChildren => return update_child_count(state, raw),
    }

    if matches!(field, Field::DepartureDate | Field::ReturnDate) {
        recompute_days(&mut next);
    }
    Ok(next)
}

/// Replaces `children_ages` with `count` zeros. Prior ages are discarded.
pub fn update_child_count(state: &FormState, raw: &str) -> Result<FormState, FormError> {
    let count = saturate_u32(parse_int(raw));
    if count > MAX_CHILDREN {
        return Err(FormError::TooManyChildren(count));
    }
    let mut next = state.clone();
    next.request.num_children = count;
    next.request.children_ages = vec![0; count as usize];
    Ok(next)
}

pub fn update_child_age(state: &FormState, index: usize, raw: &str) -> Result<FormState, FormError> {
    let len = state.request.num_children as usize;
    if index >= len {
        return Err(FormError::ChildIndexOutOfRange { index, len });
    }
    let age = parse_int(raw).clamp(0, MAX_CHILD_AGE as i64) as u8;
    let mut next = state.clone();
    next.request.children_ages[index] = age;
    Ok(next)
}

/// Recomputes `days` when both dates parse and are ordered.
/// Reversed dates set the validation error and keep the previous `days`.
/// When the dates can no longer be compared the ordering error is dropped.
pub fn recompute_days(state: &mut FormState) {
    let (Some(departure), Some(ret)) = (
        parse_date(&state.request.departure_date),
        parse_date(&state.request.return_date),
    ) else {
        clear_date_order_error(state);
        return;
    };

    if ret >= departure {
        state.request.days = trip_days(departure, ret);
        clear_date_order_error(state);
    } else {
        state.validation_error = Some(DATE_ORDER_ERROR.to_string());
    }
}

fn clear_date_order_error(state: &mut FormState) {
    if state.validation_error.as_deref() == Some(DATE_ORDER_ERROR) {
        state.validation_error = None;
    }
}

/// Whole days between the dates plus one, counting both endpoints.
pub fn trip_days(departure: NaiveDate, ret: NaiveDate) -> i64 {
    ret.signed_duration_since(departure).num_days() + 1
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Leading-integer parse: optional sign then digits, anything after is
/// ignored. No digits yields 0.
pub fn parse_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return 0;
    }
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as i64));
    if negative { -magnitude } else { magnitude }
}

fn saturate_u32(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

fn saturate_u64(v: i64) -> u64 {
    v.max(0) as u64
}
