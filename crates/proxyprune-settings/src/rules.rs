use crate::error::ConfigError;
use std::collections::BTreeMap;

/// The closed set of rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    UnattachedPolicy,
    SequentialJs,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::UnattachedPolicy => "unattached-policy",
            Rule::SequentialJs => "sequential-js",
        }
    }

    fn parse(s: &str) -> Option<Rule> {
        match s {
            "unattached-policy" => Some(Rule::UnattachedPolicy),
            "sequential-js" => Some(Rule::SequentialJs),
            _ => None,
        }
    }

    pub fn supports(self, variant: Variant) -> bool {
        match (self, variant) {
            (Rule::UnattachedPolicy, _) => true,
            (Rule::SequentialJs, Variant::ReportOnly) => true,
            (Rule::SequentialJs, Variant::ApplyAndReport) => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    ReportOnly,
    ApplyAndReport,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::ReportOnly => "report-only",
            Variant::ApplyAndReport => "apply-and-report",
        }
    }

    fn parse(s: &str) -> Option<Variant> {
        match s {
            "report-only" => Some(Variant::ReportOnly),
            "apply-and-report" => Some(Variant::ApplyAndReport),
            _ => None,
        }
    }
}

/// Parse one `rule:variant` argument.
pub fn parse_rule_spec(spec: &str) -> Result<(Rule, Variant), ConfigError> {
    let Some((rule_s, variant_s)) = spec.split_once(':') else {
        return Err(ConfigError::InvalidRuleSpec(spec.to_string()));
    };
    let rule =
        Rule::parse(rule_s).ok_or_else(|| ConfigError::UnknownRule(rule_s.to_string()))?;
    let unsupported = || ConfigError::UnsupportedVariant {
        rule: rule_s.to_string(),
        variant: variant_s.to_string(),
    };
    let variant = Variant::parse(variant_s).ok_or_else(unsupported)?;
    if !rule.supports(variant) {
        return Err(unsupported());
    }
    Ok((rule, variant))
}

/// The validated set of rules to run. Repeating a rule keeps the last
/// variant, matching positional-argument expectations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RulePlan {
    rules: BTreeMap<Rule, Variant>,
}

impl RulePlan {
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, ConfigError> {
        let mut rules = BTreeMap::new();
        for spec in specs {
            let (rule, variant) = parse_rule_spec(spec.as_ref())?;
            rules.insert(rule, variant);
        }
        Ok(Self { rules })
    }

    pub fn variant(&self, rule: Rule) -> Option<Variant> {
        self.rules.get(&rule).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rule, Variant)> + '_ {
        self.rules.iter().map(|(r, v)| (*r, *v))
    }

    /// True when any selected rule rewrites bundles.
    pub fn wants_rewrite(&self) -> bool {
        self.variant(Rule::UnattachedPolicy) == Some(Variant::ApplyAndReport)
    }
}
