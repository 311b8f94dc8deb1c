//! Catalog provider boundary.
//!
//! Immutable reference data (class types, instructors, packages) and the
//! rolling session calendar. The engine treats everything here as read-only
//! input at construction time; only [`crate::registry::SessionRegistry`]
//! mutates session occupancy afterwards.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{
    ClassSession, ClassType, ClassTypeId, Instructor, InstructorId, Money, Package, PackageId,
    SessionId,
};

/// Seats per generated session
pub const SESSION_CAPACITY: u32 = 8;

/// Class length in minutes
pub const CLASS_MINUTES: i64 = 50;

/// Wall-clock hours at which sessions start, Monday through Saturday
pub const SESSION_START_HOURS: [u32; 10] = [6, 7, 8, 9, 10, 11, 12, 17, 18, 19];

/// Credits granted by unlimited packages; doubles as the display sentinel
/// for "effectively unlimited"
pub const UNLIMITED_CLASS_COUNT: u32 = 999;

/// Immutable catalog: class types, instructors, and purchasable packages
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Kinds of classes offered
    pub class_types: Vec<ClassType>,
    /// Teaching staff
    pub instructors: Vec<Instructor>,
    /// Purchasable packages
    pub packages: Vec<Package>,
}

impl Catalog {
    /// Looks up a package by id
    #[must_use]
    pub fn find_package(&self, id: &PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| &p.id == id)
    }

    /// The studio's standard catalog: intro offers, monthly memberships,
    /// and class packs
    #[must_use]
    pub fn standard() -> Self {
        let class_types = vec![
            ClassType {
                id: ClassTypeId::new("reformer"),
                name: "Reformer".to_string(),
                duration_minutes: 50,
                description: "Signature high-intensity reformer method".to_string(),
                color: "#4a6fa5".to_string(),
            },
            ClassType {
                id: ClassTypeId::new("cardio"),
                name: "Cardio".to_string(),
                duration_minutes: 50,
                description: "Reformer work combined with cardiovascular intervals".to_string(),
                color: "#5a7fb5".to_string(),
            },
            ClassType {
                id: ClassTypeId::new("strength"),
                name: "Strength".to_string(),
                duration_minutes: 50,
                description: "Strength building and muscle toning focus".to_string(),
                color: "#6a8fc5".to_string(),
            },
        ];

        let instructors = vec![Instructor {
            id: InstructorId::new("ava-castillo"),
            name: "Ava Castillo".to_string(),
            image: Some("/instructors/ava.jpg".to_string()),
        }];

        let packages = vec![
            Package {
                id: PackageId::new("intro-single"),
                name: "Intro single class".to_string(),
                description: "Try the studio for the first time".to_string(),
                class_count: 1,
                price: Money::from_dollars(19),
                validity_days: 30,
                is_intro_offer: true,
                is_monthly: false,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("intro-3pack"),
                name: "Intro 3 class pack".to_string(),
                description: "Three classes to settle into the method".to_string(),
                class_count: 3,
                price: Money::from_dollars(62),
                validity_days: 30,
                is_intro_offer: true,
                is_monthly: false,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("monthly-4"),
                name: "4 classes monthly".to_string(),
                description: "Four classes a month, renews automatically".to_string(),
                class_count: 4,
                price: Money::from_dollars(99),
                validity_days: 30,
                is_intro_offer: false,
                is_monthly: true,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("monthly-8"),
                name: "8 classes monthly".to_string(),
                description: "Eight classes a month, renews automatically".to_string(),
                class_count: 8,
                price: Money::from_dollars(189),
                validity_days: 30,
                is_intro_offer: false,
                is_monthly: true,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("monthly-12"),
                name: "12 classes monthly".to_string(),
                description: "Twelve classes a month, renews automatically".to_string(),
                class_count: 12,
                price: Money::from_dollars(229),
                validity_days: 30,
                is_intro_offer: false,
                is_monthly: true,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("monthly-unlimited"),
                name: "Monthly unlimited".to_string(),
                description: "Unlimited classes for a full month".to_string(),
                class_count: UNLIMITED_CLASS_COUNT,
                price: Money::from_dollars(279),
                validity_days: 30,
                is_intro_offer: false,
                is_monthly: true,
                is_unlimited: true,
                popular: true,
            },
            Package {
                id: PackageId::new("pack-single"),
                name: "Single class".to_string(),
                description: "One class, no commitment".to_string(),
                class_count: 1,
                price: Money::from_dollars(35),
                validity_days: 30,
                is_intro_offer: false,
                is_monthly: false,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("pack-5"),
                name: "5 class pack".to_string(),
                description: "Pack of five classes".to_string(),
                class_count: 5,
                price: Money::from_dollars(139),
                validity_days: 60,
                is_intro_offer: false,
                is_monthly: false,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("pack-10"),
                name: "10 class pack".to_string(),
                description: "Pack of ten classes".to_string(),
                class_count: 10,
                price: Money::from_dollars(290),
                validity_days: 180,
                is_intro_offer: false,
                is_monthly: false,
                is_unlimited: false,
                popular: false,
            },
            Package {
                id: PackageId::new("pack-20"),
                name: "20 class pack".to_string(),
                description: "Pack of twenty classes, best value".to_string(),
                class_count: 20,
                price: Money::from_dollars(499),
                validity_days: 180,
                is_intro_offer: false,
                is_monthly: false,
                is_unlimited: false,
                popular: false,
            },
        ];

        Self {
            class_types,
            instructors,
            packages,
        }
    }

    /// Generates the rolling session calendar: `days` days starting at
    /// `from`, Monday through Saturday, one session per start hour, ordered
    /// by (date, start time)
    ///
    /// Sessions start empty; occupancy is owned by the registry from here on.
    #[must_use]
    pub fn generate_sessions(&self, from: NaiveDate, days: u32) -> Vec<ClassSession> {
        let Some(class_type) = self.class_types.first() else {
            return Vec::new();
        };
        let Some(instructor) = self.instructors.first() else {
            return Vec::new();
        };

        let mut sessions = Vec::new();
        for day_offset in 0..days {
            let date = from + Duration::days(i64::from(day_offset));
            if date.weekday() == Weekday::Sun {
                continue;
            }

            for hour in SESSION_START_HOURS {
                let Some(start_time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
                    continue;
                };
                let end_time = start_time + Duration::minutes(CLASS_MINUTES);
                let id = SessionId::new(format!(
                    "{date}-{start_time}-{instructor}",
                    start_time = start_time.format("%H:%M"),
                    instructor = instructor.id
                ));

                sessions.push(ClassSession::new(
                    id,
                    class_type.id.clone(),
                    instructor.id.clone(),
                    date,
                    start_time,
                    end_time,
                    SESSION_CAPACITY,
                    0,
                ));
            }
        }

        sessions
    }
}
