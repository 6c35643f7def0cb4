//! Checkout and reference-data commands.

use jacaranda_storefront::app::Storefront;
use jacaranda_storefront::services::checkout::{OrderDraft, format_zipcode};

use super::user_err;

/// Raw checkout flags as typed on the command line.
pub struct DraftArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub zipcode: String,
    pub city: String,
    pub state: String,
    pub observation: String,
}

/// Validate the draft and submit the order.
pub async fn submit(app: &Storefront, args: DraftArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session_user = app.session().current_user();

    let draft = OrderDraft {
        // Name and email prefill from the session identity, like the form
        name: args
            .name
            .or_else(|| session_user.as_ref().map(|u| u.name.clone()))
            .unwrap_or_default(),
        email: args
            .email
            .or_else(|| session_user.as_ref().map(|u| u.email.to_string()))
            .unwrap_or_default(),
        phone: args.phone,
        street: args.street,
        number: args.number,
        neighborhood: args.neighborhood,
        // The flag goes through the same formatter as the form field
        zipcode: format_zipcode(&args.zipcode),
        city: args.city,
        state: args.state,
        observation: args.observation,
    };

    let order_id = app
        .checkout()
        .submit(&draft)
        .await
        .map_err(|e| user_err(e.into()))?;

    println!("Pedido realizado com sucesso!");
    println!("Número do pedido: {order_id}");
    println!("Veja os detalhes com: jacaranda order {order_id}");
    Ok(())
}

/// Print the region reference list.
pub async fn states(app: &Storefront) {
    for state in app.checkout().list_states().await {
        println!("{}  {}", state.code, state.name);
    }
}
