#[cfg(test)]
mod tests {
    use std::i64;
    use strata_core::{AsValue, Interval};

    #[test]
    fn operations() {
        let days_11 = Interval::from_days(10) + Interval::from_secs(86400);
        assert_ne!(
            days_11 + Interval::from_millis(1),
            Interval::from_millis(950_400_000)
        );
        assert_eq!(
            days_11 + Interval::from_millis(1),
            Interval::from_millis(950_400_001)
        );

        let almost_max_days = Interval::from_days(i64::MAX - 1);
        assert_eq!(
            almost_max_days + Interval::from_nanos(Interval::NANOS_IN_DAY),
            Interval {
                months: 0,
                days: i64::MAX,
                nanos: 0,
            }
        );
        assert_eq!(
            almost_max_days + Interval::from_nanos(Interval::NANOS_IN_DAY) + Interval::from_days(1),
            Interval {
                months: 0,
                days: i64::MAX,
                nanos: Interval::NANOS_IN_DAY,
            }
        );

        assert_eq!(
            Interval {
                months: 12,
                days: 45,
                nanos: Interval::NANOS_IN_DAY * 10 + 15,
            } + Interval::from_micros(1)
                - Interval {
                    months: 9,
                    days: 1,
                    nanos: Interval::NANOS_IN_DAY,
                },
            Interval {
                months: 3,   // 12 - 9
                days: 53,    // 45 + 10 - 1 - 1
                nanos: 1015, // 15 + 1000
            }
        );
    }

    #[test]
    fn parses_unit_suffixed_literals() {
        assert_eq!(
            Interval::parse("1 year").unwrap(),
            Interval::from_years(1)
        );
        assert_eq!(Interval::parse("3 days").unwrap(), Interval::from_days(3));
        assert_eq!(
            Interval::parse("2 hours 30 mins").unwrap(),
            Interval::from_hours(2) + Interval::from_mins(30)
        );
    }

    #[test]
    fn parses_clock_format() {
        assert_eq!(
            Interval::parse("1:30:00").unwrap(),
            Interval::from_hours(1) + Interval::from_mins(30)
        );
        assert_eq!(
            Interval::parse("-0:00:05").unwrap(),
            Interval::ZERO - Interval::from_secs(5)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Interval::parse("not an interval").is_err());
    }
}
