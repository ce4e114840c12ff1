use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use tracing::{info, warn};
use vd_api_types::{Account, ElectionId, TxReceipt};
use vd_contract_client::{ContractFeatures, ContractResult, Eip1193Provider, VotingContract};
use vd_wallet::WalletConnector;

use crate::notice::Notice;
use crate::state::{AppState, Page};

/// Owns the cross-page state and drives the connect → load → act → reload cycle.
///
/// All methods take `&self`; the state lives in a `RefCell` that is only
/// borrowed between awaits, so the browser can hold the coordinator in an
/// `Rc` and run several handlers against it.
pub struct Coordinator<P> {
    wallet: WalletConnector<P>,
    contract: Rc<dyn VotingContract>,
    state: RefCell<AppState>,
}

impl<P> Coordinator<P>
where
    P: Eip1193Provider,
{
    pub fn new(wallet: WalletConnector<P>, contract: Rc<dyn VotingContract>) -> Self {
        Self {
            wallet,
            contract,
            state: RefCell::new(AppState::default()),
        }
    }

    pub fn wallet(&self) -> &WalletConnector<P> {
        &self.wallet
    }

    pub fn contract(&self) -> &Rc<dyn VotingContract> {
        &self.contract
    }

    pub fn features(&self) -> ContractFeatures {
        self.contract.features()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        f(&self.state.borrow())
    }

    pub(crate) fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut AppState) -> R,
    {
        f(&mut self.state.borrow_mut())
    }

    pub fn set_notice(&self, notice: Notice) {
        if notice.is_error() {
            warn!(text = %notice.text, "action failed");
        }
        self.update(|s| s.notice = Some(notice));
    }

    pub fn dismiss_notice(&self) {
        self.update(|s| s.notice = None);
    }

    /// Ask the wallet for an account, then load global state.
    pub async fn connect_wallet(&self) -> bool {
        let account = match self.wallet.connect().await {
            Ok(account) => account,
            Err(err) => {
                self.set_notice(err.into());
                return false;
            }
        };
        self.update(|s| {
            s.account = Some(account.clone());
            s.has_voted = false;
            s.notice = Some(Notice::success(format!("Connected as {}", account.short())));
        });

        match self.wallet.chain_id().await {
            Ok(chain_id) => self.update(|s| s.chain_id = Some(chain_id)),
            Err(err) => warn!(%err, "could not read chain id"),
        }

        self.load_global().await;
        if self.with_state(|s| s.selected.is_some()) {
            self.reload_election().await;
        }
        true
    }

    pub fn disconnect(&self) {
        self.wallet.disconnect();
        self.update(|s| {
            s.clear_account();
            s.notice = Some(Notice::info("Wallet disconnected"));
        });
    }

    /// The wallet switched (or revoked) accounts.
    pub async fn accounts_changed(&self, accounts: &[String]) {
        match self.wallet.accounts_changed(accounts) {
            Some(account) => {
                self.update(|s| {
                    s.clear_account();
                    s.account = Some(account);
                });
                self.check_owner().await;
                if self.with_state(|s| s.selected.is_some()) {
                    self.reload_election().await;
                }
            }
            None => self.update(|s| {
                s.clear_account();
                s.notice = Some(Notice::info("Wallet disconnected"));
            }),
        }
    }

    /// Election list and ownership check. A failed fetch keeps what was shown.
    pub async fn load_global(&self) {
        match self.contract.list_elections().await {
            Ok(elections) => {
                info!(count = elections.len(), "elections loaded");
                self.update(|s| {
                    if let Some(selected) = s.selected {
                        if !elections.iter().any(|election| election.id == selected) {
                            s.select(None);
                        }
                    }
                    if s.selected.is_none() && elections.len() == 1 {
                        s.select(Some(elections[0].id));
                    }
                    s.elections = elections;
                });
            }
            Err(err) => self.set_notice(Notice::error(format!("Could not load elections: {err}"))),
        }
        self.check_owner().await;
    }

    pub async fn check_owner(&self) {
        let Some(account) = self.with_state(|s| s.account.clone()) else {
            self.update(|s| s.is_owner = false);
            return;
        };
        match self.contract.owner().await {
            Ok(owner) => {
                let is_owner = owner.matches(&account);
                self.update(|s| {
                    s.is_owner = is_owner;
                    if !is_owner && s.page == Page::Admin {
                        s.page = Page::Home;
                    }
                });
            }
            Err(err) => self.set_notice(Notice::error(format!("Could not check contract owner: {err}"))),
        }
    }

    pub fn navigate(&self, page: Page) {
        if page == Page::Admin && !self.with_state(|s| s.is_owner) {
            self.set_notice(Notice::error("Administrative controls are only available to the contract owner"));
            return;
        }
        self.update(|s| s.page = page);
    }

    /// Navigate and refresh the slice of state the page shows.
    pub async fn open_page(&self, page: Page) {
        self.navigate(page);
        if self.with_state(|s| s.page) != page {
            return;
        }
        match page {
            Page::Home | Page::Admin => {
                self.load_global().await;
                self.reload_election().await;
            }
            Page::Vote | Page::Results => self.reload_election().await,
        }
    }

    pub async fn select_election(&self, election: ElectionId) {
        self.update(|s| s.select(Some(election)));
        self.reload_election().await;
    }

    /// Candidates, vote record and balance for the selected election. A
    /// failed candidate fetch keeps the list only if it was fetched for the
    /// same election.
    pub async fn reload_election(&self) {
        let Some(election) = self.with_state(|s| s.selected) else {
            return;
        };

        match self.contract.candidates(election).await {
            Ok(candidates) => self.update(|s| {
                if s.selected == Some(election) {
                    s.candidates = candidates;
                    s.candidates_for = Some(election);
                }
            }),
            Err(err) => self.set_notice(Notice::error(format!("Could not load candidates: {err}"))),
        }

        if let Some(account) = self.with_state(|s| s.account.clone()) {
            match self.contract.has_voted(election, &account).await {
                Ok(Some(voted)) => self.update(|s| {
                    if s.selected == Some(election) {
                        s.has_voted = voted;
                    }
                }),
                // No queryable record: keep whatever this session learned.
                Ok(None) => {}
                Err(err) => warn!(%err, "could not read vote record"),
            }
        }

        self.refresh_balance().await;
    }

    pub async fn refresh_balance(&self) {
        if !self.features().token_balance {
            return;
        }
        let Some(account) = self.with_state(|s| s.account.clone()) else {
            return;
        };
        match self.contract.token_balance(&account).await {
            Ok(balance) => self.update(|s| s.token_balance = Some(balance)),
            Err(err) => warn!(%err, "could not read token balance"),
        }
    }

    pub(crate) fn require_account(&self) -> Result<Account, Notice> {
        self.with_state(|s| s.account.clone())
            .ok_or_else(|| Notice::error("Connect your wallet first"))
    }

    /// Run one write operation with a pending label, turning the outcome into
    /// a notice. Returns the receipt on success.
    pub(crate) async fn submit<F>(&self, label: &str, done: &str, op: F) -> Option<TxReceipt>
    where
        F: Future<Output = ContractResult<TxReceipt>>,
    {
        self.update(|s| {
            s.pending = Some(label.to_owned());
            s.notice = Some(Notice::info(label));
        });
        let outcome = op.await;
        self.update(|s| s.pending = None);

        match outcome {
            Ok(receipt) => {
                info!(tx_hash = %receipt.tx_hash.0, label, "action confirmed");
                self.set_notice(Notice::success(done));
                Some(receipt)
            }
            Err(err) => {
                self.set_notice(err.into());
                None
            }
        }
    }
}
