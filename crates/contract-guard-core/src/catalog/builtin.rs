//! Hand-authored rules shipped with the crate.
//!
//! Declaration order is observable: the analyzer reports matches in this order.

use super::{AppliesTo, Rule, Sector, Severity};

struct Def {
    name: &'static str,
    description: &'static str,
    sector: Sector,
    applies_to: AppliesTo,
    any: &'static [&'static str],
    all: &'static [&'static str],
    severity: Severity,
    suggestion: &'static str,
    evidence: bool,
}

impl From<&Def> for Rule {
    fn from(def: &Def) -> Self {
        Rule {
            name: def.name.to_string(),
            description: def.description.to_string(),
            sector: def.sector,
            applies_to: def.applies_to,
            keywords_any: def.any.iter().map(|k| k.to_string()).collect(),
            keywords_all: def.all.iter().map(|k| k.to_string()).collect(),
            severity: def.severity,
            suggestion: def.suggestion.to_string(),
            emit_evidence: def.evidence,
        }
    }
}

pub(super) fn rules() -> Vec<Rule> {
    DEFS.iter().map(Rule::from).collect()
}

const DEFS: &[Def] = &[
    // Generic
    Def {
        name: "Unilateral amendment",
        description: "One party may change the terms of the contract without the other's consent.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Both,
        any: &[
            "unilaterally",
            "at its sole discretion",
            "reserves the right to modify",
            "reserves the right to change",
        ],
        all: &[],
        severity: Severity::High,
        suggestion: "Require written agreement from both parties for any amendment, or at least prior notice with a right to terminate without penalty.",
        evidence: true,
    },
    Def {
        name: "Automatic renewal",
        description: "The contract renews by itself unless cancelled within a window that is easy to miss.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Both,
        any: &["automatically renew", "automatic renewal", "renewed automatically"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Ask for a renewal reminder and a reasonable cancellation window before each renewal date.",
        evidence: true,
    },
    Def {
        name: "Termination penalty",
        description: "Ending the contract early triggers a fine or liquidated damages.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Both,
        any: &["penalty", "liquidated damages", "termination fee"],
        all: &["terminat"],
        severity: Severity::High,
        suggestion: "Cap the penalty, make it proportional to the remaining term, and waive it when the other party is in breach.",
        evidence: true,
    },
    Def {
        name: "Waiver of rights",
        description: "A party gives up legal rights or remedies in advance.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Both,
        any: &["waives any right", "waive any right", "irrevocably waives", "waiver of rights"],
        all: &[],
        severity: Severity::High,
        suggestion: "Strike blanket waivers; rights granted by law usually cannot be waived in advance.",
        evidence: true,
    },
    Def {
        name: "Arbitration clause",
        description: "Disputes are taken out of the courts and decided by an arbitrator.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Both,
        any: &["binding arbitration", "arbitration"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Check who chooses and pays the arbitrator and whether small claims may still go to court.",
        evidence: true,
    },
    Def {
        name: "Distant forum",
        description: "Disputes must be brought in a jurisdiction chosen by the drafting party.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Both,
        any: &["exclusive jurisdiction", "elect the forum", "venue shall be"],
        all: &[],
        severity: Severity::Low,
        suggestion: "Prefer the forum of the requester's domicile.",
        evidence: true,
    },
    Def {
        name: "Limitation of liability",
        description: "The provider excludes or caps its liability for damages it causes.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Requester,
        any: &[
            "shall not be liable",
            "will not be liable",
            "limitation of liability",
            "in no event",
        ],
        all: &[],
        severity: Severity::High,
        suggestion: "Keep liability for gross negligence, wilful misconduct and data loss outside any cap.",
        evidence: true,
    },
    Def {
        name: "Personal data sharing",
        description: "Personal data may be shared with third parties.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Requester,
        any: &["third parties", "third-party partners", "affiliates"],
        all: &["personal data"],
        severity: Severity::Medium,
        suggestion: "Limit sharing to what is needed to perform the contract and require consent for anything else.",
        evidence: true,
    },
    Def {
        name: "Broad indemnification",
        description: "The provider must indemnify the other side for losses it did not cause.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Provider,
        any: &["indemnify", "hold harmless"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Restrict indemnities to losses caused by your own breach or negligence and cap the amount.",
        evidence: true,
    },
    Def {
        name: "Intellectual property assignment",
        description: "All rights in the work product are transferred to the client.",
        sector: Sector::Generic,
        applies_to: AppliesTo::Provider,
        any: &["work made for hire", "assigns all intellectual property", "all right, title and interest"],
        all: &[],
        severity: Severity::High,
        suggestion: "Keep ownership of pre-existing tools and license, rather than assign, reusable components.",
        evidence: true,
    },
    // Loans
    Def {
        name: "Compound interest",
        description: "Interest is charged on previously accrued interest.",
        sector: Sector::Loans,
        applies_to: AppliesTo::Requester,
        any: &["compound interest", "capitalized interest", "capitalization of interest", "interest on interest"],
        all: &[],
        severity: Severity::High,
        suggestion: "Ask for the effective rate and the full amortization schedule before signing.",
        evidence: true,
    },
    Def {
        name: "Late payment charges",
        description: "Late installments carry fines, default interest or collection costs.",
        sector: Sector::Loans,
        applies_to: AppliesTo::Both,
        any: &["late fee", "late payment", "default interest", "arrears"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Check that fines and default interest respect the legal caps and are not cumulative.",
        evidence: true,
    },
    Def {
        name: "Acceleration of debt",
        description: "A single missed payment makes the whole balance due at once.",
        sector: Sector::Loans,
        applies_to: AppliesTo::Requester,
        any: &["acceleration", "immediately due", "accelerate"],
        all: &[],
        severity: Severity::High,
        suggestion: "Negotiate a cure period and a minimum number of missed installments before acceleration.",
        evidence: true,
    },
    Def {
        name: "Bundled insurance",
        description: "The loan requires buying insurance, often from the lender itself.",
        sector: Sector::Loans,
        applies_to: AppliesTo::Requester,
        any: &["credit insurance", "mandatory insurance", "insurance is required"],
        all: &["insurance"],
        severity: Severity::Medium,
        suggestion: "Tied selling is often unlawful; ask to choose the insurer or remove the requirement.",
        evidence: true,
    },
    // Education
    Def {
        name: "Tuition readjustment",
        description: "Tuition may be raised during the contract term.",
        sector: Sector::Education,
        applies_to: AppliesTo::Requester,
        any: &["tuition increase", "readjust", "annual adjustment"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Ask for the adjustment index and the maximum yearly increase in writing.",
        evidence: true,
    },
    Def {
        name: "Non-refundable enrollment",
        description: "Fees paid at enrollment are kept even if the student withdraws.",
        sector: Sector::Education,
        applies_to: AppliesTo::Requester,
        any: &["non-refundable", "no refund"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Ask for a proportional refund when withdrawal happens before classes start.",
        evidence: true,
    },
    // Health plans
    Def {
        name: "Waiting period",
        description: "Coverage only starts after a waiting period.",
        sector: Sector::HealthPlan,
        applies_to: AppliesTo::Requester,
        any: &["grace period", "waiting period"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Confirm the waiting periods respect regulatory maximums, and that emergencies are covered at once.",
        evidence: true,
    },
    Def {
        name: "Pre-existing condition exclusion",
        description: "Conditions existing before enrollment are excluded or delayed.",
        sector: Sector::HealthPlan,
        applies_to: AppliesTo::Requester,
        any: &["pre-existing", "preexisting"],
        all: &[],
        severity: Severity::High,
        suggestion: "Ask how pre-existing conditions are defined and for how long partial coverage applies.",
        evidence: true,
    },
    Def {
        name: "Coverage exclusions",
        description: "The plan lists procedures it does not cover.",
        sector: Sector::HealthPlan,
        applies_to: AppliesTo::Both,
        any: &["not covered", "excluded from coverage", "exclusions"],
        all: &[],
        severity: Severity::Low,
        suggestion: "Compare the exclusion list with the mandatory coverage list for your plan type.",
        evidence: false,
    },
    // SaaS / services
    Def {
        name: "Warranty disclaimer",
        description: "The service is provided without any guarantee of availability or fitness.",
        sector: Sector::Services,
        applies_to: AppliesTo::Requester,
        any: &["provided as is", "as-is", "without warranty", "no warranty"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Ask for a service level agreement with uptime targets and service credits.",
        evidence: true,
    },
    Def {
        name: "Data deletion on termination",
        description: "Customer data may be deleted or retained at will once the contract ends.",
        sector: Sector::Services,
        applies_to: AppliesTo::Requester,
        any: &["delete your data", "data will be deleted", "retain your data"],
        all: &["terminat"],
        severity: Severity::Medium,
        suggestion: "Require an export window and written confirmation of deletion after termination.",
        evidence: true,
    },
    Def {
        name: "Unlimited scope",
        description: "The provider must deliver unlimited revisions or changes for a fixed price.",
        sector: Sector::Services,
        applies_to: AppliesTo::Provider,
        any: &["unlimited revisions", "unlimited changes", "unlimited support"],
        all: &[],
        severity: Severity::Medium,
        suggestion: "Define the number of revision rounds included and bill extra work separately.",
        evidence: true,
    },
];
