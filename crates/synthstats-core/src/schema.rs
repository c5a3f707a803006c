use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_SEED: u64 = 42;
pub const SALES_ROWS: usize = 500;
pub const ACTIVITY_ROWS: usize = 1000;
pub const TOP_USERS: usize = 5;

/// Every column name the pipelines read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Product,
    Region,
    Sales,
    Revenue,
    Month,
    Quarter,
    User,
    Activity,
    Likes,
    Comments,
    Day,
    Weekday,
    Count,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Product => "product",
            Field::Region => "region",
            Field::Sales => "sales",
            Field::Revenue => "revenue",
            Field::Month => "month",
            Field::Quarter => "quarter",
            Field::User => "user",
            Field::Activity => "activity",
            Field::Likes => "likes",
            Field::Comments => "comments",
            Field::Day => "day",
            Field::Weekday => "weekday",
            Field::Count => "count",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const SALES_COLUMNS: [Field; 5] = [
    Field::Date,
    Field::Product,
    Field::Region,
    Field::Sales,
    Field::Revenue,
];

pub const ACTIVITY_COLUMNS: [Field; 5] = [
    Field::Date,
    Field::User,
    Field::Activity,
    Field::Likes,
    Field::Comments,
];

macro_rules! category {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All values in declared order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = String;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{other}'", $label)),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                $name::try_from(raw.as_str()).map_err(de::Error::custom)
            }
        }
    };
}

category!(Product, "product" {
    A => "Product A",
    B => "Product B",
    C => "Product C",
});

category!(Region, "region" {
    North => "North",
    South => "South",
    East => "East",
});

category!(User, "user" {
    A => "User_A",
    B => "User_B",
    C => "User_C",
});

category!(
    /// Kind of social interaction; also the column order of the daily pivot.
    Activity, "activity" {
        Post => "Post",
        Like => "Like",
        Comment => "Comment",
        Share => "Share",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_parse_display_names() {
        assert_eq!(Product::try_from("Product B"), Ok(Product::B));
        assert_eq!(Region::try_from(" East "), Ok(Region::East));
        assert_eq!(User::try_from("User_C"), Ok(User::C));
        assert!(Activity::try_from("Retweet").is_err());
        assert_eq!(Activity::Comment.to_string(), "Comment");
    }

    #[test]
    fn activity_order_is_declared_order() {
        let names: Vec<&str> = Activity::ALL.iter().map(Activity::as_str).collect();
        assert_eq!(names, ["Post", "Like", "Comment", "Share"]);
    }
}
