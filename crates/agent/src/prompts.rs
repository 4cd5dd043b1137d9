//! Role-specific prompt assembly.
//!
//! Prompts embed the persona voice lines and the cleaned inbound message,
//! and always end with the same instruction: answer with the email body
//! text only, no subject line, no signature block markup.

use mailduet_core::personas::DemoCast;
use mailduet_core::scoring::{FitReport, Recommendation};

const REPLY_RULES: &str = "Write only the body text of the email. Do not include a subject \
                           line, headers, or any commentary outside the email itself. Keep it \
                           under 150 words.";

/// The opening email the seller sends to start the conversation.
pub fn seller_opening(cast: &DemoCast) -> String {
    format!(
        "You are {seller_name}, a sales representative at {seller_company}. {pitch}\n\n\
         Write a short, friendly cold outreach email to {buyer_name} at {buyer_company}. \
         Introduce the product in two sentences, ask one question about their current \
         process, and avoid pressure tactics.\n\n{rules}",
        seller_name = cast.seller.name,
        seller_company = cast.seller.company,
        pitch = cast.seller.product_pitch,
        buyer_name = cast.buyer.name,
        buyer_company = cast.buyer.company,
        rules = REPLY_RULES,
    )
}

/// The seller's reply to an inbound buyer message, steered by the fit report.
pub fn seller_reply(
    cast: &DemoCast,
    from: &str,
    subject: &str,
    cleaned_body: &str,
    report: &FitReport,
) -> String {
    let steering = match report.recommendation {
        Recommendation::ProposeMeeting => {
            "The prospect qualifies well. Propose a 30-minute call and offer two concrete \
             time slots next week."
                .to_owned()
        }
        Recommendation::Clarify => {
            let missing: Vec<&str> =
                report.missing_info.iter().map(|field| field.name()).collect();
            if missing.is_empty() {
                "The fit is unclear. Ask one or two focused qualifying questions before \
                 suggesting any next step."
                    .to_owned()
            } else {
                format!(
                    "The fit is promising but incomplete. Ask about their {} before \
                     suggesting any next step.",
                    missing.join(", ")
                )
            }
        }
        Recommendation::Decline => {
            "The prospect does not fit the target profile. Politely decline to push further, \
             thank them for their time, and leave the door open."
                .to_owned()
        }
    };

    format!(
        "You are {seller_name}, a sales representative at {seller_company}. {pitch}\n\n\
         You received this email from {from} with the subject \"{subject}\":\n\
         ---\n{body}\n---\n\n\
         Qualification result: score {score}/100 ({recommendation}). {steering}\n\n{rules}",
        seller_name = cast.seller.name,
        seller_company = cast.seller.company,
        pitch = cast.seller.product_pitch,
        from = from,
        subject = subject,
        body = cleaned_body,
        score = report.overall,
        recommendation = report.recommendation.as_str(),
        steering = steering,
        rules = REPLY_RULES,
    )
}

/// The buyer's reply to an inbound seller message.
pub fn buyer_reply(cast: &DemoCast, from: &str, subject: &str, cleaned_body: &str) -> String {
    format!(
        "You are {buyer_name}, who handles tooling decisions at {buyer_company}. {situation}\n\n\
         You received this email from {from} with the subject \"{subject}\":\n\
         ---\n{body}\n---\n\n\
         Reply in character: stay curious but pragmatic, answer at most one question asked of \
         you, and share one concrete detail about your company's needs. Do not agree to a \
         meeting unless one was explicitly proposed.\n\n{rules}",
        buyer_name = cast.buyer.name,
        buyer_company = cast.buyer.company,
        situation = cast.buyer.situation,
        from = from,
        subject = subject,
        body = cleaned_body,
        rules = REPLY_RULES,
    )
}

#[cfg(test)]
mod tests {
    use mailduet_core::personas::DemoCast;
    use mailduet_core::scoring::{BuyerProfile, FitScorer, SellerCriteria};

    use super::{buyer_reply, seller_opening, seller_reply};

    fn report(email_text: &str, buyer: &BuyerProfile) -> mailduet_core::scoring::FitReport {
        let criteria = SellerCriteria {
            industries: vec!["SaaS".to_owned()],
            company_size_min: 50,
            company_size_max: 200,
            geographies: vec!["USA".to_owned()],
            budget_min: 8_000,
            budget_max: 12_000,
            required_stack: None,
        };
        FitScorer::default().score(&criteria, buyer, email_text)
    }

    fn fitting_buyer() -> BuyerProfile {
        BuyerProfile {
            industry: "SaaS".to_owned(),
            company_size: 120,
            location: "USA".to_owned(),
            budget: None,
            stack: None,
            timing: None,
            authority: None,
        }
    }

    #[test]
    fn opening_prompt_names_both_parties() {
        let cast = DemoCast::default();
        let prompt = seller_opening(&cast);
        assert!(prompt.contains(&cast.seller.name));
        assert!(prompt.contains(&cast.buyer.company));
        assert!(prompt.contains("body text of the email"));
    }

    #[test]
    fn seller_reply_embeds_the_inbound_message_and_score() {
        let cast = DemoCast::default();
        let report = report("We are looking for a solution", &fitting_buyer());
        let prompt =
            seller_reply(&cast, "buyer@demo.test", "Re: intro", "We are looking for a solution", &report);

        assert!(prompt.contains("buyer@demo.test"));
        assert!(prompt.contains("Re: intro"));
        assert!(prompt.contains("We are looking for a solution"));
        assert!(prompt.contains("78/100"));
    }

    #[test]
    fn high_fit_steers_toward_a_meeting_proposal() {
        let cast = DemoCast::default();
        let report = report("We are looking for a solution", &fitting_buyer());
        let prompt = seller_reply(&cast, "buyer@demo.test", "Re: intro", "body", &report);
        assert!(prompt.contains("Propose a 30-minute call"));
    }

    #[test]
    fn partial_fit_asks_for_the_missing_fields_by_name() {
        let cast = DemoCast::default();
        let mut buyer = fitting_buyer();
        buyer.industry = "Farming".to_owned();
        let report = report("hello", &buyer);
        assert_eq!(report.recommendation, mailduet_core::scoring::Recommendation::Clarify);

        let prompt = seller_reply(&cast, "buyer@demo.test", "Re: intro", "hello", &report);
        assert!(prompt.contains("budget"));
        assert!(prompt.contains("timing"));
        assert!(prompt.contains("authority"));
    }

    #[test]
    fn poor_fit_steers_toward_a_polite_decline() {
        let cast = DemoCast::default();
        let buyer = BuyerProfile {
            industry: "Farming".to_owned(),
            company_size: 9,
            location: "Mars".to_owned(),
            budget: Some(10),
            stack: None,
            timing: None,
            authority: None,
        };
        let report = report("hi", &buyer);
        let prompt = seller_reply(&cast, "buyer@demo.test", "Re: intro", "hi", &report);
        assert!(prompt.contains("Politely decline"));
    }

    #[test]
    fn buyer_reply_speaks_in_the_buyer_voice() {
        let cast = DemoCast::default();
        let prompt = buyer_reply(&cast, "seller@demo.test", "Quick intro", "Would love to chat.");
        assert!(prompt.contains(&cast.buyer.name));
        assert!(prompt.contains("seller@demo.test"));
        assert!(prompt.contains("Would love to chat."));
    }
}
