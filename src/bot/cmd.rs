use crate::wise::model::Currency;
use teloxide::macros::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display this text.")]
    Help,
    #[command(description = "show enabled and disabled accounts.")]
    List,
    #[command(
        description = "link an account: name, api token, balance currency, jar currency. It starts disabled.",
        parse_with = "split"
    )]
    Add {
        name: String,
        token: String,
        balance: Currency,
        jar: Currency,
    },
    #[command(description = "start sweeping the account with this token.")]
    Enable { token: String },
    #[command(description = "stop sweeping the account with this token.")]
    Disable { token: String },
    #[command(description = "forget the account with this token.")]
    Delete { token: String },
}
