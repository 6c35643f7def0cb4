//! Session management commands.

use jacaranda_storefront::app::Storefront;

use super::user_err;

/// Log in and activate the session.
pub async fn login(
    app: &Storefront,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = app.login(email, password).await.map_err(user_err)?;
    println!("Login realizado com sucesso! Bem-vindo(a), {}.", user.name);
    Ok(())
}

/// Create a new account. Does not log in.
pub async fn register(
    app: &Storefront,
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if password != confirm_password {
        return Err("As senhas não coincidem".into());
    }

    app.register(name, email, password).await.map_err(user_err)?;
    println!("Cadastro realizado com sucesso! Faça login para continuar.");
    Ok(())
}

/// End the session and discard the cart.
pub async fn logout(app: &Storefront) {
    app.logout().await;
    println!("Logout realizado com sucesso!");
}

/// Show the current session identity.
pub fn whoami(app: &Storefront) {
    match app.session().current_user() {
        Some(user) => println!("{} <{}> (id {})", user.name, user.email, user.id),
        None => println!("Nenhuma sessão ativa."),
    }
}
