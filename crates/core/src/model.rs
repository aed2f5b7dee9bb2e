#![forbid(unsafe_code)]

use crate::dates::{self, iso_date};
use crate::ids::{ContractId, Plate};
use serde::{Deserialize, Serialize};
use time::Date;

pub const DEFAULT_CONTRACT_KIND: &str = "렌트";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BikeStatus {
    #[default]
    #[serde(rename = "사용가능")]
    Available,
    #[serde(rename = "대여중")]
    Rented,
    #[serde(rename = "정비중")]
    Maintenance,
}

impl BikeStatus {
    pub const ALL: [BikeStatus; 3] = [Self::Available, Self::Rented, Self::Maintenance];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "사용가능",
            Self::Rented => "대여중",
            Self::Maintenance => "정비중",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    #[default]
    #[serde(rename = "정상")]
    Normal,
    #[serde(rename = "연체")]
    Overdue,
    #[serde(rename = "종료")]
    Terminated,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 3] = [Self::Normal, Self::Overdue, Self::Terminated];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "정상",
            Self::Overdue => "연체",
            Self::Terminated => "종료",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Bike status a contract in `status` implies for the bike it references.
pub fn desired_bike_status(status: ContractStatus) -> BikeStatus {
    if status.is_terminated() {
        BikeStatus::Available
    } else {
        BikeStatus::Rented
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bike {
    pub plate: Plate,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub status: BikeStatus,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fees {
    pub day: u64,
    pub week: u64,
    pub month: u64,
}

impl Fees {
    pub fn from_day_fee(day: u64) -> Self {
        Self {
            day,
            week: day.saturating_mul(7),
            month: day.saturating_mul(30),
        }
    }
}

/// A rental contract as persisted. Key names follow the stored layout (`bike` holds the plate,
/// `type` the contract kind, `fee` the billing amount).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub id: ContractId,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(rename = "bike")]
    pub plate: Plate,
    #[serde(default)]
    pub bike_model: String,
    #[serde(deserialize_with = "loose::amount", default)]
    pub day_fee: u64,
    #[serde(deserialize_with = "loose::amount", default)]
    pub week_fee: u64,
    #[serde(deserialize_with = "loose::amount", default)]
    pub month_fee: u64,
    #[serde(rename = "fee", deserialize_with = "loose::amount", default)]
    pub billing_amount: u64,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(deserialize_with = "loose::count", default)]
    pub days: u32,
    #[serde(with = "iso_date")]
    pub end: Date,
    #[serde(default)]
    pub status: ContractStatus,
    #[serde(default)]
    pub archived: bool,
}

impl Contract {
    /// Neither archived nor terminated.
    pub fn is_active(&self) -> bool {
        !self.archived && !self.status.is_terminated()
    }

    pub fn period_dates(&self) -> Vec<Date> {
        dates::period_dates(self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    #[serde(deserialize_with = "loose::truthy", default)]
    pub paid: bool,
    #[serde(deserialize_with = "loose::amount", default)]
    pub ts: i64,
}

// Older records were written by a dynamically typed client. Flags read by truthiness and numbers
// read from whatever JSON value holds them, rounded to whole units; anything unreadable is zero.
mod loose {
    use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

    pub(super) fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(deserializer.deserialize_any(LooseVisitor)?.is_truthy())
    }

    pub(super) fn amount<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64> + Bounded,
    {
        let value = deserializer.deserialize_any(LooseVisitor)?.whole();
        Ok(T::try_from(value).unwrap_or(T::MAX))
    }

    pub(super) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        amount(deserializer)
    }

    pub(super) trait Bounded {
        const MAX: Self;
    }

    impl Bounded for u64 {
        const MAX: Self = u64::MAX;
    }

    impl Bounded for u32 {
        const MAX: Self = u32::MAX;
    }

    impl Bounded for i64 {
        const MAX: Self = i64::MAX;
    }

    enum Loose {
        Number(f64),
        Text(String),
        Flag(bool),
        Null,
        Nested,
    }

    impl Loose {
        fn is_truthy(&self) -> bool {
            match self {
                Self::Number(v) => *v != 0.0 && !v.is_nan(),
                Self::Text(v) => !v.is_empty(),
                Self::Flag(v) => *v,
                Self::Null => false,
                Self::Nested => true,
            }
        }

        /// Non-negative whole number, rounded half away from zero.
        fn whole(&self) -> u64 {
            let number = match self {
                Self::Number(v) => *v,
                Self::Text(v) => v.trim().parse::<f64>().unwrap_or(0.0),
                Self::Flag(v) => f64::from(u8::from(*v)),
                Self::Null | Self::Nested => 0.0,
            };
            if number.is_finite() && number > 0.0 {
                number.round() as u64
            } else {
                0
            }
        }
    }

    struct LooseVisitor;

    impl<'de> Visitor<'de> for LooseVisitor {
        type Value = Loose;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("any json value")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Loose, E> {
            Ok(Loose::Flag(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Loose, E> {
            Ok(Loose::Number(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Loose, E> {
            Ok(Loose::Number(v as f64))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Loose, E> {
            Ok(Loose::Number(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Loose, E> {
            Ok(Loose::Text(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Loose, E> {
            Ok(Loose::Null)
        }

        fn visit_none<E: de::Error>(self) -> Result<Loose, E> {
            Ok(Loose::Null)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Loose, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(Loose::Nested)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Loose, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Loose::Nested)
        }
    }
}
