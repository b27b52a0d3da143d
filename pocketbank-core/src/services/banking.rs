//! Banking service - the user-facing operations
//!
//! Every operation takes the caller's [`SessionContext`], resets its idle
//! countdown, and persists changes through a single directory write.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{
    format_currency, generate_pin, normalize_username, Account, AccountKind, DisplayName,
    LedgerSummary, LoanDecision, SessionContext, SortOrder, Transaction, TransactionKind, User,
    TAG_TRANSFER,
};

use super::directory::UserDirectory;
use super::session::SessionService;

/// Input collected by the signup form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub nationality: Option<String>,
    /// Defaults to the lower-cased initials of the name
    #[serde(default)]
    pub username: Option<String>,
}

/// Result of a completed transfer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub sender_balance: Decimal,
}

/// Result of a loan request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOutcome {
    pub decision: LoanDecision,
    pub amount: Decimal,
    pub balance: Decimal,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub username: String,
    pub first_name: String,
    pub date: NaiveDate,
    pub total_balance: Decimal,
    pub total_balance_display: String,
    pub accounts: Vec<AccountView>,
    /// Account the movements and summary belong to
    pub selected: AccountKind,
    pub movements: Vec<MovementView>,
    pub summary: SummaryView,
    /// Idle time left, `mm:ss`
    pub session_remaining: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub balance_display: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementView {
    pub number: usize,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub amount_display: String,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub interest: Decimal,
    pub total_in_display: String,
    pub total_out_display: String,
    pub interest_display: String,
}

impl SummaryView {
    fn new(summary: LedgerSummary, symbol: &str) -> Self {
        Self {
            total_in: summary.total_deposits,
            total_out: summary.total_withdrawals,
            interest: summary.interest,
            total_in_display: format_currency(summary.total_deposits, symbol),
            total_out_display: format_currency(summary.total_withdrawals, symbol),
            interest_display: format_currency(summary.interest, symbol),
        }
    }
}

/// Banking service composing the directory and sessions
pub struct BankingService {
    directory: UserDirectory,
    sessions: Arc<SessionService>,
    config: Config,
}

impl BankingService {
    pub fn new(directory: UserDirectory, sessions: Arc<SessionService>, config: Config) -> Self {
        Self {
            directory,
            sessions,
            config,
        }
    }

    /// Register a new user with a generated PIN
    ///
    /// The returned user carries the PIN so it can be shown once.
    pub fn signup(&self, request: SignupRequest, now: DateTime<Utc>) -> Result<User> {
        let name = DisplayName::new(&request.first_name, &request.last_name);
        if name.first.is_empty() || name.last.is_empty() {
            return Err(Error::validation("first and last name are required"));
        }
        let id_number = request.id_number.trim();
        if id_number.is_empty() {
            return Err(Error::validation("ID number is required"));
        }
        if request.date_of_birth > now.date_naive() {
            return Err(Error::validation("date of birth cannot be in the future"));
        }

        let username = match request.username.as_deref().map(normalize_username) {
            Some(u) if !u.is_empty() => u,
            Some(_) => return Err(Error::validation("username cannot be blank")),
            None => name.initials(),
        };
        if username.chars().any(char::is_whitespace) {
            return Err(Error::validation("username cannot contain spaces"));
        }

        let user = User::new(
            &username,
            name,
            id_number,
            request.date_of_birth,
            request.nationality.unwrap_or_default(),
            generate_pin(),
            self.config.welcome_bonus,
            now,
        );
        self.directory.create(user)
    }

    /// The logged-in user's record
    pub fn current_user(&self, ctx: &SessionContext) -> Result<User> {
        self.directory
            .find_by_username(&ctx.username)?
            .ok_or_else(|| Error::UserNotFound(ctx.username.clone()))
    }

    /// Credit one of the user's accounts
    pub fn deposit(
        &self,
        ctx: &mut SessionContext,
        kind: AccountKind,
        amount: Decimal,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        self.sessions.touch(ctx, now)?;
        self.with_account(&ctx.username, kind, |account| {
            account.deposit(amount, description, now).cloned()
        })
    }

    /// Debit one of the user's accounts
    pub fn withdraw(
        &self,
        ctx: &mut SessionContext,
        kind: AccountKind,
        amount: Decimal,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        self.sessions.touch(ctx, now)?;
        self.with_account(&ctx.username, kind, |account| {
            account.withdraw(amount, description, now).cloned()
        })
    }

    /// Move money between two users' primary accounts
    ///
    /// Both records are updated in one directory write: either both legs
    /// are stored or neither is.
    pub fn transfer(
        &self,
        ctx: &mut SessionContext,
        recipient: &str,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TransferReceipt> {
        self.sessions.touch(ctx, now)?;
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        let recipient = normalize_username(recipient);
        if recipient == ctx.username {
            return Err(Error::SelfTransferRejected);
        }
        let sender = ctx.username.clone();

        self.directory.transact(|users| {
            let sender_idx = users
                .iter()
                .position(|u| u.username == sender)
                .ok_or_else(|| Error::UserNotFound(sender.clone()))?;
            let recipient_idx = users
                .iter()
                .position(|u| u.username == recipient)
                .ok_or_else(|| Error::RecipientNotFound(recipient.clone()))?;

            let from = primary_mut(&mut users[sender_idx])?;
            from.withdraw_tagged(
                amount,
                format!("Transfer to {}", recipient),
                Some(TAG_TRANSFER),
                now,
            )?;
            let sender_balance = from.balance;

            let to = primary_mut(&mut users[recipient_idx])?;
            to.deposit_tagged(
                amount,
                format!("Transfer from {}", sender),
                Some(TAG_TRANSFER),
                now,
            )?;

            Ok(TransferReceipt {
                from: sender.clone(),
                to: recipient.clone(),
                amount,
                sender_balance,
            })
        })
    }

    /// Ask for a loan into the primary account
    pub fn request_loan(
        &self,
        ctx: &mut SessionContext,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<LoanOutcome> {
        self.sessions.touch(ctx, now)?;
        let ratio = self.config.loan_deposit_ratio;
        self.directory.transact(|users| {
            let user = users
                .iter_mut()
                .find(|u| u.username == ctx.username)
                .ok_or_else(|| Error::UserNotFound(ctx.username.clone()))?;
            let account = primary_mut(user)?;
            let decision = account.request_loan(amount, ratio, now)?;
            Ok(LoanOutcome {
                decision,
                amount,
                balance: account.balance,
            })
        })
    }

    /// Delete the logged-in user after re-checking their credentials
    pub fn close_account(
        &self,
        ctx: &mut SessionContext,
        username: &str,
        pin: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.sessions.touch(ctx, now)?;
        if normalize_username(username) != ctx.username
            || !self.directory.authenticate(&ctx.username, pin)?
        {
            return Err(Error::AuthenticationFailed);
        }
        self.directory.delete(&ctx.username)?;
        self.sessions.logout()?;
        ctx.timer.cancel();
        Ok(())
    }

    /// Balances, movements, and summary for one account (primary by default)
    pub fn dashboard(
        &self,
        ctx: &mut SessionContext,
        selected: Option<AccountKind>,
        order: SortOrder,
        now: DateTime<Utc>,
    ) -> Result<Dashboard> {
        self.sessions.touch(ctx, now)?;
        let user = self.current_user(ctx)?;
        let symbol = self.config.currency_symbol.as_str();
        let total_balance = user.total_balance()?;

        let account = match selected {
            Some(kind) => user.account(kind),
            None => user.primary_account(),
        }
        .ok_or_else(|| Error::validation("account not found"))?;

        let movements = account
            .list_transactions(order)
            .enumerate()
            .map(|(i, tx)| MovementView {
                number: i + 1,
                kind: tx.kind,
                date: tx.date,
                amount: tx.amount,
                amount_display: format_currency(tx.amount.abs(), symbol),
                description: tx.description.clone(),
                tags: tx.tags.clone(),
            })
            .collect();

        Ok(Dashboard {
            username: user.username.clone(),
            first_name: user.display_name.first.clone(),
            date: now.date_naive(),
            total_balance,
            total_balance_display: format_currency(total_balance, symbol),
            accounts: user
                .accounts
                .iter()
                .map(|a| AccountView {
                    id: a.id,
                    kind: a.kind,
                    balance: a.balance,
                    balance_display: format_currency(a.balance, symbol),
                })
                .collect(),
            selected: account.kind,
            movements,
            summary: SummaryView::new(account.aggregate(self.config.interest_rate)?, symbol),
            session_remaining: ctx.timer.display(now),
        })
    }

    fn with_account<T, F>(&self, username: &str, kind: AccountKind, f: F) -> Result<T>
    where
        F: FnOnce(&mut Account) -> Result<T>,
    {
        self.directory.transact(|users| {
            let user = users
                .iter_mut()
                .find(|u| u.username == username)
                .ok_or_else(|| Error::UserNotFound(username.to_string()))?;
            let account = user
                .account_mut(kind)
                .ok_or_else(|| Error::validation(format!("no {} account", kind)))?;
            f(account)
        })
    }
}

fn primary_mut(user: &mut User) -> Result<&mut Account> {
    let username = user.username.clone();
    user.primary_account_mut()
        .ok_or_else(|| Error::validation(format!("{} has no primary account", username)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::TAG_LOAN;
    use chrono::Duration;

    struct Harness {
        banking: BankingService,
        sessions: Arc<SessionService>,
        directory: UserDirectory,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let config = Config::default();
        let directory = UserDirectory::new(store.clone());
        let sessions = Arc::new(SessionService::new(
            store,
            directory.clone(),
            config.session_timeout(),
        ));
        let banking = BankingService::new(directory.clone(), Arc::clone(&sessions), config);
        Harness {
            banking,
            sessions,
            directory,
        }
    }

    fn signup(h: &Harness, first: &str, last: &str, id: &str) -> User {
        h.banking
            .signup(
                SignupRequest {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    id_number: id.to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                    nationality: None,
                    username: None,
                },
                Utc::now(),
            )
            .unwrap()
    }

    fn login(h: &Harness, user: &User) -> SessionContext {
        h.sessions.login(&user.username, &user.pin, Utc::now()).unwrap()
    }

    #[test]
    fn test_signup_seeds_two_accounts() {
        let h = harness();
        let user = signup(&h, "Thandi", "Mokoena", "900101");

        assert_eq!(user.username, "tm");
        assert_eq!(user.accounts.len(), 2);
        for account in &user.accounts {
            assert_eq!(account.balance, Decimal::from(50));
            assert_eq!(account.transactions.len(), 1);
        }
        assert!(h.directory.authenticate("TM", &user.pin).unwrap());
    }

    #[test]
    fn test_signup_validation() {
        let h = harness();
        let mut request = SignupRequest {
            first_name: " ".to_string(),
            last_name: "Mokoena".to_string(),
            id_number: "1".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            nationality: None,
            username: None,
        };
        assert!(matches!(
            h.banking.signup(request.clone(), Utc::now()),
            Err(Error::Validation(_))
        ));

        request.first_name = "Thandi".to_string();
        request.date_of_birth = (Utc::now() + Duration::days(2)).date_naive();
        assert!(matches!(
            h.banking.signup(request, Utc::now()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_signup_duplicate_initials() {
        let h = harness();
        signup(&h, "Thandi", "Mokoena", "1");
        let err = h
            .banking
            .signup(
                SignupRequest {
                    first_name: "Tom".to_string(),
                    last_name: "Mbeki".to_string(),
                    id_number: "2".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                    nationality: None,
                    username: None,
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateUsername(_)));
    }

    #[test]
    fn test_transfer_moves_money_between_primaries() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let bob = signup(&h, "Bob", "Khumalo", "2");
        let mut ctx = login(&h, &alice);

        let total_before: Decimal = h.directory.list().unwrap().iter().map(|u| u.total_balance().unwrap()).sum();

        let receipt = h
            .banking
            .transfer(&mut ctx, " BK ", Decimal::from(30), Utc::now())
            .unwrap();
        assert_eq!(receipt.sender_balance, Decimal::from(20));

        let alice_after = h.directory.find_by_username(&alice.username).unwrap().unwrap();
        let bob_after = h.directory.find_by_username(&bob.username).unwrap().unwrap();
        assert_eq!(alice_after.primary_account().unwrap().balance, Decimal::from(20));
        assert_eq!(bob_after.primary_account().unwrap().balance, Decimal::from(80));
        assert!(bob_after
            .primary_account()
            .unwrap()
            .transactions
            .last()
            .unwrap()
            .has_tag(TAG_TRANSFER));

        let total_after: Decimal = h.directory.list().unwrap().iter().map(|u| u.total_balance().unwrap()).sum();
        assert_eq!(total_before, total_after);
    }

    #[test]
    fn test_transfer_failures_change_nothing() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        signup(&h, "Bob", "Khumalo", "2");
        let mut ctx = login(&h, &alice);
        let before = h.directory.list().unwrap();

        assert!(matches!(
            h.banking.transfer(&mut ctx, "bk", Decimal::from(51), Utc::now()),
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            h.banking.transfer(&mut ctx, "nobody", Decimal::from(5), Utc::now()),
            Err(Error::RecipientNotFound(_))
        ));
        assert!(matches!(
            h.banking.transfer(&mut ctx, "AZ", Decimal::from(5), Utc::now()),
            Err(Error::SelfTransferRejected)
        ));
        assert!(matches!(
            h.banking.transfer(&mut ctx, "bk", Decimal::ZERO, Utc::now()),
            Err(Error::InvalidAmount(_))
        ));

        assert_eq!(h.directory.list().unwrap(), before);
    }

    #[test]
    fn test_loan_uses_primary_account() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let mut ctx = login(&h, &alice);

        // Welcome bonus of 50 covers loans up to 500
        let outcome = h
            .banking
            .request_loan(&mut ctx, Decimal::from(500), Utc::now())
            .unwrap();
        assert_eq!(outcome.decision, LoanDecision::Approved);
        assert_eq!(outcome.balance, Decimal::from(550));

        let declined = h
            .banking
            .request_loan(&mut ctx, Decimal::from(5501), Utc::now())
            .unwrap();
        assert_eq!(declined.decision, LoanDecision::Declined);
        assert_eq!(declined.balance, Decimal::from(550));

        let stored = h.banking.current_user(&ctx).unwrap();
        let primary = stored.primary_account().unwrap();
        assert_eq!(primary.transactions.len(), 2);
        assert!(primary.transactions[1].has_tag(TAG_LOAN));
    }

    #[test]
    fn test_deposit_and_withdraw_on_savings() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let mut ctx = login(&h, &alice);

        h.banking
            .deposit(&mut ctx, AccountKind::Savings, Decimal::from(100), "Stokvel", Utc::now())
            .unwrap();
        let tx = h
            .banking
            .withdraw(&mut ctx, AccountKind::Savings, Decimal::from(25), "Taxi", Utc::now())
            .unwrap();
        assert_eq!(tx.amount, Decimal::from(-25));

        let user = h.banking.current_user(&ctx).unwrap();
        assert_eq!(user.account(AccountKind::Savings).unwrap().balance, Decimal::from(125));
        assert_eq!(user.account(AccountKind::Checking).unwrap().balance, Decimal::from(50));
    }

    #[test]
    fn test_close_account_requires_matching_credentials() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let mut ctx = login(&h, &alice);

        assert!(matches!(
            h.banking.close_account(&mut ctx, "az", "0000", Utc::now()),
            Err(Error::AuthenticationFailed)
        ));
        assert!(matches!(
            h.banking.close_account(&mut ctx, "someone", &alice.pin, Utc::now()),
            Err(Error::AuthenticationFailed)
        ));

        h.banking
            .close_account(&mut ctx, " AZ ", &alice.pin, Utc::now())
            .unwrap();
        assert!(h.directory.find_by_username("az").unwrap().is_none());
        assert!(matches!(
            h.sessions.resume(Utc::now()),
            Err(Error::NotLoggedIn)
        ));
    }

    #[test]
    fn test_operations_after_expiry_are_refused() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let start = Utc::now();
        let mut ctx = h.sessions.login(&alice.username, &alice.pin, start).unwrap();

        let err = h
            .banking
            .deposit(
                &mut ctx,
                AccountKind::Checking,
                Decimal::from(10),
                "Late",
                start + Duration::minutes(11),
            )
            .unwrap_err();
        assert!(matches!(err, Error::SessionExpired));
        assert_eq!(
            h.banking.current_user(&ctx).unwrap().total_balance().unwrap(),
            Decimal::from(100)
        );
    }

    #[test]
    fn test_dashboard() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let mut ctx = login(&h, &alice);
        let now = Utc::now();

        h.banking
            .deposit(&mut ctx, AccountKind::Checking, Decimal::from(1000), "Salary", now)
            .unwrap();
        h.banking
            .withdraw(&mut ctx, AccountKind::Checking, Decimal::from(200), "Rent", now)
            .unwrap();

        let dashboard = h
            .banking
            .dashboard(&mut ctx, None, SortOrder::AmountDesc, now)
            .unwrap();
        assert_eq!(dashboard.first_name, "Alice");
        assert_eq!(dashboard.selected, AccountKind::Checking);
        assert_eq!(dashboard.accounts.len(), 2);
        assert_eq!(dashboard.total_balance_display, "R 900,00");
        assert_eq!(dashboard.movements.len(), 3);
        assert_eq!(dashboard.movements[0].description, "Salary");
        assert_eq!(dashboard.movements[2].amount_display, "R 200,00");
        assert_eq!(dashboard.summary.total_in, Decimal::from(1050));
        assert_eq!(dashboard.summary.total_out, Decimal::from(200));
        assert_eq!(dashboard.summary.interest_display, "R 12,60");
        assert_eq!(dashboard.session_remaining, "10:00");
    }

    #[test]
    fn test_out_of_range_amounts_are_errors() {
        let h = harness();
        let alice = signup(&h, "Alice", "Zulu", "1");
        let mut ctx = login(&h, &alice);
        let now = Utc::now();
        let large = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);

        let err = h
            .banking
            .deposit(&mut ctx, AccountKind::Checking, Decimal::MAX, "Too much", now)
            .unwrap_err();
        assert!(matches!(err, Error::AmountTooLarge(_)));
        assert_eq!(
            h.banking.current_user(&ctx).unwrap().total_balance().unwrap(),
            Decimal::from(100)
        );

        // Each balance stays in range but total deposits do not
        h.banking
            .deposit(&mut ctx, AccountKind::Checking, large, "In", now)
            .unwrap();
        h.banking
            .withdraw(&mut ctx, AccountKind::Checking, large, "Out", now)
            .unwrap();
        h.banking
            .deposit(&mut ctx, AccountKind::Checking, large, "In again", now)
            .unwrap();
        let err = h
            .banking
            .dashboard(&mut ctx, None, SortOrder::DateDesc, now)
            .unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }
}
