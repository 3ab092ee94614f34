use std::fmt;

use chrono::Weekday;
use tracing::debug;

use crate::models::{OrganizationBlock, TimeOfDayRange};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// One reason a proposed set of organization blocks was rejected. Every
/// variant names the weekday and the organizations/ranges involved so the
/// report is actionable without looking at the raw configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleConflict {
    /// Two blocks claim the same organization; a doctor owns at most one
    /// schedule per organization.
    DuplicateOrganization { organization_id: String },

    /// A range is structurally invalid (inverted or out of the 0..=1440
    /// minute bounds).
    MalformedRange {
        organization_id: String,
        weekday: Weekday,
        range: TimeOfDayRange,
    },

    /// The doctor would be scheduled at two organizations at once.
    CrossOrganization {
        weekday: Weekday,
        first_organization: String,
        first_range: TimeOfDayRange,
        second_organization: String,
        second_range: TimeOfDayRange,
    },

    /// Two ranges of one organization's day overlap while serving the same
    /// modality (equal types, or either is `both`), which would double-book
    /// that modality.
    AmbiguousOverlap {
        weekday: Weekday,
        organization_id: String,
        first_range: TimeOfDayRange,
        second_range: TimeOfDayRange,
    },
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleConflict::DuplicateOrganization { organization_id } => {
                write!(f, "more than one block for organization {}", organization_id)
            }
            ScheduleConflict::MalformedRange {
                organization_id,
                weekday,
                range,
            } => write!(
                f,
                "{}: malformed range {} at organization {}",
                weekday, range, organization_id
            ),
            ScheduleConflict::CrossOrganization {
                weekday,
                first_organization,
                first_range,
                second_organization,
                second_range,
            } => write!(
                f,
                "{}: {} at organization {} overlaps {} at organization {}",
                weekday, first_range, first_organization, second_range, second_organization
            ),
            ScheduleConflict::AmbiguousOverlap {
                weekday,
                organization_id,
                first_range,
                second_range,
            } => write!(
                f,
                "{}: {} overlaps {} for the same modality at organization {}",
                weekday, first_range, second_range, organization_id
            ),
        }
    }
}

/// Checks a proposed set of per-organization weekly blocks before the
/// configuration store accepts them. All conflicts are accumulated rather
/// than short-circuiting on the first one.
///
/// Within one organization and day the permissive "overlay" policy applies:
/// overlapping ranges are allowed when their modalities are disjoint
/// (ambulatory vs virtual, neither `both`), and rejected otherwise.
pub fn validate_blocks(blocks: &[OrganizationBlock]) -> Result<(), Vec<ScheduleConflict>> {
    let mut conflicts = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        if blocks[..index]
            .iter()
            .any(|earlier| earlier.organization_id == block.organization_id)
        {
            conflicts.push(ScheduleConflict::DuplicateOrganization {
                organization_id: block.organization_id.clone(),
            });
        }
    }

    for weekday in WEEKDAYS {
        for block in blocks {
            for range in block.schedule.ranges_for(weekday) {
                if !range.is_well_formed() {
                    conflicts.push(ScheduleConflict::MalformedRange {
                        organization_id: block.organization_id.clone(),
                        weekday,
                        range: *range,
                    });
                }
            }
        }

        // No minute may be open at two organizations at once.
        for (index, first) in blocks.iter().enumerate() {
            for second in &blocks[index + 1..] {
                if first.organization_id == second.organization_id {
                    continue;
                }
                for first_range in first.schedule.ranges_for(weekday) {
                    for second_range in second.schedule.ranges_for(weekday) {
                        if first_range.overlaps(second_range) {
                            conflicts.push(ScheduleConflict::CrossOrganization {
                                weekday,
                                first_organization: first.organization_id.clone(),
                                first_range: *first_range,
                                second_organization: second.organization_id.clone(),
                                second_range: *second_range,
                            });
                        }
                    }
                }
            }
        }

        // Within one organization's day, overlapping ranges must serve
        // disjoint modalities.
        for block in blocks {
            let ranges = block.schedule.ranges_for(weekday);
            for (index, first_range) in ranges.iter().enumerate() {
                for second_range in &ranges[index + 1..] {
                    if first_range.overlaps(second_range)
                        && first_range
                            .appointment_type
                            .conflicts_with(second_range.appointment_type)
                    {
                        conflicts.push(ScheduleConflict::AmbiguousOverlap {
                            weekday,
                            organization_id: block.organization_id.clone(),
                            first_range: *first_range,
                            second_range: *second_range,
                        });
                    }
                }
            }
        }
    }

    if conflicts.is_empty() {
        Ok(())
    } else {
        debug!("Schedule rejected with {} conflict(s)", conflicts.len());
        Err(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentType, TimeOfDayRange, WeeklySchedule};

    fn range(start: u16, end: u16, appointment_type: AppointmentType) -> TimeOfDayRange {
        TimeOfDayRange::new(start, end, appointment_type).unwrap()
    }

    fn block(organization_id: &str, schedule: WeeklySchedule) -> OrganizationBlock {
        OrganizationBlock {
            organization_id: organization_id.to_string(),
            schedule,
        }
    }

    #[test]
    fn disjoint_blocks_validate_cleanly() {
        let blocks = [
            block(
                "org-a",
                WeeklySchedule {
                    mon: vec![range(540, 720, AppointmentType::Ambulatory)],
                    ..WeeklySchedule::default()
                },
            ),
            block(
                "org-b",
                WeeklySchedule {
                    mon: vec![range(720, 900, AppointmentType::Virtual)],
                    ..WeeklySchedule::default()
                },
            ),
        ];

        assert!(validate_blocks(&blocks).is_ok());
    }

    #[test]
    fn cross_organization_overlap_names_weekday_and_both_organizations() {
        // Both organizations configure Tuesday 09:00-10:00.
        let blocks = [
            block(
                "org-a",
                WeeklySchedule {
                    tue: vec![range(540, 600, AppointmentType::Ambulatory)],
                    ..WeeklySchedule::default()
                },
            ),
            block(
                "org-b",
                WeeklySchedule {
                    tue: vec![range(540, 600, AppointmentType::Virtual)],
                    ..WeeklySchedule::default()
                },
            ),
        ];

        let conflicts = validate_blocks(&blocks).unwrap_err();

        assert_eq!(conflicts.len(), 1);
        let report = conflicts[0].to_string();
        assert!(report.contains("Tue"), "report was: {}", report);
        assert!(report.contains("org-a"), "report was: {}", report);
        assert!(report.contains("org-b"), "report was: {}", report);
    }

    #[test]
    fn same_day_overlap_with_disjoint_modalities_is_allowed() {
        // The overlay case: an ambulatory range and a virtual range may
        // share minutes within one organization.
        let blocks = [block(
            "org-a",
            WeeklySchedule {
                wed: vec![
                    range(540, 720, AppointmentType::Ambulatory),
                    range(600, 660, AppointmentType::Virtual),
                ],
                ..WeeklySchedule::default()
            },
        )];

        assert!(validate_blocks(&blocks).is_ok());
    }

    #[test]
    fn same_day_overlap_with_colliding_modalities_is_rejected() {
        let same_type = [block(
            "org-a",
            WeeklySchedule {
                wed: vec![
                    range(540, 720, AppointmentType::Virtual),
                    range(600, 660, AppointmentType::Virtual),
                ],
                ..WeeklySchedule::default()
            },
        )];
        let via_both = [block(
            "org-a",
            WeeklySchedule {
                wed: vec![
                    range(540, 720, AppointmentType::Ambulatory),
                    range(600, 660, AppointmentType::Both),
                ],
                ..WeeklySchedule::default()
            },
        )];

        assert!(matches!(
            validate_blocks(&same_type).unwrap_err().as_slice(),
            [ScheduleConflict::AmbiguousOverlap { .. }]
        ));
        assert!(matches!(
            validate_blocks(&via_both).unwrap_err().as_slice(),
            [ScheduleConflict::AmbiguousOverlap { .. }]
        ));
    }

    #[test]
    fn duplicate_organization_ids_are_rejected() {
        let blocks = [
            block("org-a", WeeklySchedule::default()),
            block("org-a", WeeklySchedule::default()),
        ];

        let conflicts = validate_blocks(&blocks).unwrap_err();

        assert!(matches!(
            conflicts.as_slice(),
            [ScheduleConflict::DuplicateOrganization { organization_id }]
                if organization_id == "org-a"
        ));
    }

    #[test]
    fn all_conflicts_are_accumulated() {
        let blocks = [
            block(
                "org-a",
                WeeklySchedule {
                    mon: vec![range(540, 720, AppointmentType::Ambulatory)],
                    tue: vec![
                        range(540, 660, AppointmentType::Both),
                        range(600, 720, AppointmentType::Virtual),
                    ],
                    ..WeeklySchedule::default()
                },
            ),
            block(
                "org-b",
                WeeklySchedule {
                    mon: vec![range(600, 780, AppointmentType::Virtual)],
                    ..WeeklySchedule::default()
                },
            ),
        ];

        let conflicts = validate_blocks(&blocks).unwrap_err();

        // One cross-organization Monday conflict plus one ambiguous
        // Tuesday overlap.
        assert_eq!(conflicts.len(), 2);
    }

    #[test]
    fn malformed_range_is_reported_with_its_organization() {
        let blocks = [block(
            "org-a",
            WeeklySchedule {
                // Constructed directly to bypass TimeOfDayRange::new.
                fri: vec![TimeOfDayRange {
                    start_minute: 700,
                    end_minute: 600,
                    appointment_type: AppointmentType::Ambulatory,
                }],
                ..WeeklySchedule::default()
            },
        )];

        let conflicts = validate_blocks(&blocks).unwrap_err();

        assert!(matches!(
            conflicts.as_slice(),
            [ScheduleConflict::MalformedRange { weekday: Weekday::Fri, .. }]
        ));
    }
}
