//! Walks one donation from amount selection to the confirmation receipt

use donate::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DonateConfig::from_yaml_file(&path)?,
        None => DonateConfig::default_config(),
    };

    println!("💚 KindStream donation walkthrough\n");
    println!("Presets: {:?}\n", config.presets.iter().map(ToString::to_string).collect::<Vec<_>>());

    // Donor types a custom amount, changes their mind, then taps the $25 preset
    let flow = DonationFlow::with_schedule(config.fees)
        .enter_custom_mode()
        .update_custom_text("0");
    if let Err(e) = flow.finalize(&config.limits) {
        println!("⚠️  {}", e);
    }

    let Some(preset) = config.presets.get(2).copied() else {
        anyhow::bail!("configuration has fewer than three presets");
    };
    let flow = flow.select_preset(preset);
    let fees = flow.fees();
    println!("Donation {} + fee ${} = total ${}", preset, fees.fee, fees.total);

    let donation = flow.finalize(&config.limits)?;

    let bus = EventBus::default();
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(envelope) = events.recv().await {
            println!("   📣 {}", envelope.event.action());
        }
    });

    let session = CheckoutSession::new(donation, config.simulated_processor())
        .with_timeout(config.charge_timeout())
        .with_events(bus);

    let form = PaymentForm {
        cardholder_name: "Jane Doe".to_string(),
        email: "donor@example.com".to_string(),
        card_number: "4242 4242 4242 4242".to_string(),
        expiry: "12/29".to_string(),
        cvv: "123".to_string(),
    };

    match session.submit(form).await {
        Ok(SubmissionOutcome::Success(receipt)) => {
            let record = ConfirmationRecord::assemble(session.donation(), receipt);
            println!("\n✅ Transaction {}", record.transaction_id());
            println!("   Card {}", record.masked_card());
            println!("   Share: {}", record.share_message());
        }
        Ok(SubmissionOutcome::Failure { reason }) => {
            println!("\n❌ {}: {}", reason.title(), reason);
        }
        Err(e) => {
            let message = e.to_user_message();
            println!("\n⚠️  {}: {}", message.title, message.message);
        }
    }

    let intent = config
        .mock_gateway()
        .create_payment_intent(&PaymentIntentRequest::new(
            session.donation().total_charge(),
            config.gateway.currency.clone(),
        ))
        .await;
    match intent {
        Ok(intent) => println!("\nMock intent {}", intent.payment_intent_id),
        Err(e) => println!("\nMock backend: {}", e),
    }

    Ok(())
}
