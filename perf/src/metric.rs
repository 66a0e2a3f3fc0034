use strum_macros::{Display, EnumString, EnumVariantNames};

/// Summary columns that can be checked or compared
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, EnumString, Display, EnumVariantNames)]
pub enum Metric {
    #[strum(serialize = "Min")]
    Min,
    #[strum(serialize = "Median")]
    Median,
    #[strum(serialize = "99%")]
    P99,
    #[strum(serialize = "Max")]
    Max,
    #[strum(serialize = "Lost [samples]")]
    Lost,
    #[strum(serialize = "Subscription throughput [Mb/s]")]
    SubscriptionThroughput,
}

/// Which side of the requirement an experiment value must lie on
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Direction {
    /// Experiment must not exceed the requirement
    AtMost,
    /// Experiment must meet or exceed the requirement
    AtLeast,
}

impl Metric {
    pub fn direction(&self) -> Direction {
        match self {
            Metric::SubscriptionThroughput => Direction::AtLeast,
            _ => Direction::AtMost,
        }
    }

    /// Column name, as found in summary and requirement files
    pub fn column(&self) -> String {
        self.to_string()
    }
}

impl Direction {
    /// Evaluate `requirement - experiment`
    pub fn passes(&self, diff: f64) -> bool {
        match self {
            Direction::AtMost => diff >= 0.0,
            Direction::AtLeast => diff <= 0.0,
        }
    }
}

/// Benchmark pipeline kind
#[derive(Eq, PartialEq, Copy, Clone, Debug, Display)]
#[strum(serialize_all = "kebab_case")]
pub enum Kind {
    Latency,
    Throughput,
}

impl Kind {
    /// Payload column used in summaries, requirements and check reports
    pub fn payload_column(&self) -> &'static str {
        match self {
            Kind::Latency => "Bytes",
            Kind::Throughput => "Payload [Bytes]",
        }
    }

    /// Checked metrics, in return code bit order
    pub fn checks(&self) -> &'static [Metric] {
        match self {
            Kind::Latency => &[Metric::Median, Metric::P99, Metric::Max],
            Kind::Throughput => &[Metric::Lost, Metric::SubscriptionThroughput],
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(Metric::P99.column(), "99%");
        assert_eq!(Metric::SubscriptionThroughput.column(), "Subscription throughput [Mb/s]");
        assert_eq!(Metric::from_str("Lost [samples]").unwrap(), Metric::Lost);
    }

    #[test]
    fn variant_names_parse() {
        use strum::VariantNames;

        assert_eq!(Metric::VARIANTS.len(), 6);
        for v in Metric::VARIANTS {
            assert_eq!(Metric::from_str(v).unwrap().column(), *v);
        }
    }

    #[test]
    fn directions() {
        assert!(Metric::Max.direction().passes(10.0));
        assert!(Metric::Max.direction().passes(0.0));
        assert!(!Metric::Max.direction().passes(-10.0));

        assert!(Metric::SubscriptionThroughput.direction().passes(-10.0));
        assert!(Metric::SubscriptionThroughput.direction().passes(0.0));
        assert!(!Metric::SubscriptionThroughput.direction().passes(10.0));
    }
}
