//! The two scripted characters of the demo conversation.
//!
//! The cast is fixed: prompts quote the persona fields verbatim, and the
//! seller's targeting criteria are what the fit scorer evaluates the buyer
//! against. Nothing here is persisted.

use crate::scoring::{BuyerProfile, SellerCriteria};

#[derive(Clone, Debug)]
pub struct SellerPersona {
    pub name: String,
    pub company: String,
    pub product_pitch: String,
    pub criteria: SellerCriteria,
}

#[derive(Clone, Debug)]
pub struct BuyerPersona {
    pub name: String,
    pub company: String,
    pub situation: String,
    pub profile: BuyerProfile,
}

#[derive(Clone, Debug)]
pub struct DemoCast {
    pub seller: SellerPersona,
    pub buyer: BuyerPersona,
}

impl Default for DemoCast {
    fn default() -> Self {
        Self {
            seller: SellerPersona {
                name: "Ava Reyes".to_owned(),
                company: "Flowmetric".to_owned(),
                product_pitch: "Flowmetric is a revenue-analytics platform that plugs into \
                                your CRM and billing stack and surfaces pipeline risk within \
                                a day of onboarding."
                    .to_owned(),
                criteria: SellerCriteria {
                    industries: vec!["SaaS".to_owned(), "Logistics".to_owned()],
                    company_size_min: 50,
                    company_size_max: 500,
                    geographies: vec!["USA".to_owned(), "Canada".to_owned()],
                    budget_min: 8_000,
                    budget_max: 30_000,
                    required_stack: None,
                },
            },
            buyer: BuyerPersona {
                name: "Sam Okafor".to_owned(),
                company: "Brightpath Logistics".to_owned(),
                situation: "Brightpath runs regional freight for mid-market retailers and is \
                            shopping for tooling to forecast quarterly revenue without a \
                            spreadsheet farm."
                    .to_owned(),
                profile: BuyerProfile {
                    industry: "Logistics".to_owned(),
                    company_size: 180,
                    location: "USA".to_owned(),
                    budget: None,
                    stack: None,
                    timing: None,
                    authority: None,
                },
            },
        }
    }
}
