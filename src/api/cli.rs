use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::core::TaxPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "budget-engine",
    about = "Monthly budget calculator (income normalization + estimated taxes + expenses)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    #[command(flatten)]
    pub policy: TaxPolicyArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON calculation API.
    Serve {
        #[arg(long, env = "BUDGET_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Calculate one budget from a JSON payload file and print the report.
    Calculate {
        #[arg(long, short)]
        input: PathBuf,
        #[arg(long, help = "Pretty-print the JSON report")]
        pretty: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TaxPolicyArgs {
    #[arg(
        long,
        global = true,
        env = "BUDGET_SOCIAL_SECURITY_RATE",
        default_value_t = 6.2,
        help = "Social Security rate in percent"
    )]
    pub social_security_rate: f64,
    #[arg(
        long,
        global = true,
        env = "BUDGET_MEDICARE_RATE",
        default_value_t = 1.45,
        help = "Medicare rate in percent"
    )]
    pub medicare_rate: f64,
    #[arg(
        long,
        global = true,
        env = "BUDGET_ADDITIONAL_MEDICARE_RATE",
        default_value_t = 0.9,
        help = "Additional Medicare rate in percent above the filing-status threshold"
    )]
    pub additional_medicare_rate: f64,
    #[arg(
        long,
        global = true,
        env = "BUDGET_SOCIAL_SECURITY_WAGE_BASE",
        default_value_t = 168_600.0,
        help = "Annual wages subject to Social Security when the cap is on"
    )]
    pub social_security_wage_base: f64,
    #[arg(
        long,
        global = true,
        env = "BUDGET_FICA_WAGE_BASE_CAP",
        default_value_t = true,
        action = ArgAction::Set,
        help = "Cap Social Security at the wage base (true/false)"
    )]
    pub fica_wage_base_cap: bool,
    #[arg(
        long,
        global = true,
        env = "BUDGET_DEFAULT_STATE_RATE",
        default_value_t = 5.0,
        help = "Flat state rate in percent for states without a table entry"
    )]
    pub default_state_rate: f64,
    #[arg(
        long,
        global = true,
        env = "BUDGET_DEPENDENT_CREDIT",
        default_value_t = 2_000.0,
        help = "Annual non-refundable credit per dependent"
    )]
    pub dependent_credit: f64,
}

fn check_percent(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{name} must be between 0 and 100"));
    }
    Ok(())
}

pub fn build_policy(args: &TaxPolicyArgs) -> Result<TaxPolicy, String> {
    for (name, value) in [
        ("--social-security-rate", args.social_security_rate),
        ("--medicare-rate", args.medicare_rate),
        ("--additional-medicare-rate", args.additional_medicare_rate),
        ("--default-state-rate", args.default_state_rate),
    ] {
        check_percent(name, value)?;
    }
    if !args.social_security_wage_base.is_finite() || args.social_security_wage_base < 0.0 {
        return Err("--social-security-wage-base must be >= 0".to_string());
    }
    if !args.dependent_credit.is_finite() || args.dependent_credit < 0.0 {
        return Err("--dependent-credit must be >= 0".to_string());
    }

    Ok(TaxPolicy {
        social_security_rate: args.social_security_rate / 100.0,
        medicare_rate: args.medicare_rate / 100.0,
        additional_medicare_rate: args.additional_medicare_rate / 100.0,
        social_security_wage_base: args.social_security_wage_base,
        apply_social_security_wage_base: args.fica_wage_base_cap,
        default_state_rate: args.default_state_rate / 100.0,
        dependent_credit: args.dependent_credit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn defaults_match_tax_policy_default() {
        let cli = parse(&["budget-engine", "serve"]);
        let policy = build_policy(&cli.policy).expect("valid policy");
        let default = TaxPolicy::default();
        assert_approx(policy.social_security_rate, default.social_security_rate);
        assert_approx(policy.medicare_rate, default.medicare_rate);
        assert_approx(policy.additional_medicare_rate, default.additional_medicare_rate);
        assert_approx(policy.default_state_rate, default.default_state_rate);
        assert_approx(policy.social_security_wage_base, default.social_security_wage_base);
        assert_eq!(
            policy.apply_social_security_wage_base,
            default.apply_social_security_wage_base
        );
        assert!(matches!(cli.command, Command::Serve { port: 8080 }));
    }

    #[test]
    fn wage_base_cap_can_be_turned_off() {
        let cli = parse(&[
            "budget-engine",
            "calculate",
            "--input",
            "budget.json",
            "--fica-wage-base-cap",
            "false",
        ]);
        let policy = build_policy(&cli.policy).expect("valid policy");
        assert!(!policy.apply_social_security_wage_base);
        match cli.command {
            Command::Calculate { input, pretty } => {
                assert_eq!(input, PathBuf::from("budget.json"));
                assert!(!pretty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let mut cli = parse(&["budget-engine", "serve"]);
        cli.policy.default_state_rate = 140.0;
        let err = build_policy(&cli.policy).expect_err("must reject rate");
        assert!(err.contains("--default-state-rate"));

        cli.policy.default_state_rate = 5.0;
        cli.policy.social_security_wage_base = -1.0;
        let err = build_policy(&cli.policy).expect_err("must reject wage base");
        assert!(err.contains("--social-security-wage-base"));
    }
}
