//! Main application state and update loop

use std::sync::{Arc, Mutex};
use std::thread;

use ckb_types::core::TransactionView;
use ckb_types::packed;
use ckb_types::prelude::*;
use eframe::egui;

use rusty_sudt_chain_adapters::{
    decode_address, encode_address, AdapterConfig, HttpChainRpc, PrivateKeySigner, SystemWait,
};
use rusty_sudt_chain_core::{
    collect_udt_balance, confirm_transaction, ChainRpcPort, NetworkEnv, PortError, ScriptConfig,
    SignerPort, TxAssembler, DEFAULT_FEE_RATE, ISSUE_CELL_CAPACITY_CKB,
};

use crate::state::{BalanceState, FlowEvent, IssueState, TransferState};
use crate::ui;

/// Everything the worker threads need to reach the chain.
pub struct ChainContext {
    pub env: NetworkEnv,
    pub client: HttpChainRpc,
    pub signer: PrivateKeySigner,
    pub wait: SystemWait,
    pub sudt: Option<ScriptConfig>,
}

impl ChainContext {
    pub fn from_config(config: &AdapterConfig) -> Result<Self, PortError> {
        Ok(Self {
            env: config.network,
            client: HttpChainRpc::new(config.rpc_url.clone())?,
            signer: PrivateKeySigner::new(config.network, &config.private_key)?,
            wait: SystemWait,
            sudt: config.sudt.clone(),
        })
    }
}

type Mailbox = Arc<Mutex<Vec<FlowEvent>>>;

/// The main application state
pub struct App {
    chain: Arc<ChainContext>,
    /// The signer's own address, rendered in the header.
    address: String,
    active_tab: Tab,
    issue_state: IssueState,
    transfer_state: TransferState,
    balance_state: BalanceState,
    /// Async flow event receivers, drained every frame.
    issue_events: Mailbox,
    transfer_events: Mailbox,
    balance_result: Arc<Mutex<Option<Result<u128, String>>>>,
}

/// Available tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Issue,
    Transfer,
    Balance,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>, chain: ChainContext) -> Self {
        let address = encode_address(&chain.signer.lock_script(), chain.env).unwrap_or_default();
        Self {
            chain: Arc::new(chain),
            address,
            active_tab: Tab::default(),
            issue_state: IssueState::default(),
            transfer_state: TransferState::default(),
            balance_state: BalanceState::default(),
            issue_events: Arc::new(Mutex::new(Vec::new())),
            transfer_events: Arc::new(Mutex::new(Vec::new())),
            balance_result: Arc::new(Mutex::new(None)),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.drain_flow_events();
        self.check_balance_result();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(
                    egui::RichText::new("🪙 rusty-sudt")
                        .size(22.0)
                        .color(egui::Color32::from_rgb(0, 212, 170)),
                );
                ui.add_space(30.0);
                ui.separator();
                ui.add_space(10.0);
                ui.selectable_value(&mut self.active_tab, Tab::Issue, "🏭 Issue");
                ui.selectable_value(&mut self.active_tab, Tab::Transfer, "📤 Transfer");
                ui.selectable_value(&mut self.active_tab, Tab::Balance, "💰 Balance");
            });
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("{}", self.chain.env)).weak());
                ui.separator();
                ui::copyable_value(ui, &self.address);
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                match self.active_tab {
                    Tab::Issue => self.render_issue_tab(ui, ctx),
                    Tab::Transfer => self.render_transfer_tab(ui, ctx),
                    Tab::Balance => self.render_balance_tab(ui, ctx),
                }
                ui.add_space(20.0);
            });
        });
    }
}

impl App {
    fn render_issue_tab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui::styled_heading(ui, "Issue Tokens");
        ui.label(format!(
            "Mint sUDT tokens to your own lock in a fresh {ISSUE_CELL_CAPACITY_CKB} CKB cell."
        ));
        ui.add_space(15.0);

        ui.horizontal(|ui| {
            ui.label("Amount:");
            ui::number_input(ui, &mut self.issue_state.amount, "e.g., 1000");
        });
        ui.add_space(10.0);

        let can_submit = !self.issue_state.progress.processing && self.chain.sudt.is_some();
        if ui
            .add_enabled(can_submit, egui::Button::new("🏭 Issue"))
            .clicked()
        {
            self.trigger_issue(ctx);
        }
        if self.chain.sudt.is_none() {
            self.hint_missing_contract(ui);
        }

        self.render_flow_progress(ui, Tab::Issue);
    }

    fn render_transfer_tab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui::styled_heading(ui, "Transfer Tokens");
        ui.label("Send sUDT tokens you issued to another address.");
        ui.add_space(15.0);

        ui.horizontal(|ui| {
            ui.label("Recipient:");
            ui::address_input(ui, &mut self.transfer_state.recipient);
        });
        ui.horizontal(|ui| {
            ui.label("Amount:");
            ui::number_input(ui, &mut self.transfer_state.amount, "e.g., 100");
        });
        ui.add_space(10.0);

        let can_submit = !self.transfer_state.progress.processing && self.chain.sudt.is_some();
        if ui
            .add_enabled(can_submit, egui::Button::new("📤 Transfer"))
            .clicked()
        {
            self.trigger_transfer(ctx);
        }
        if self.chain.sudt.is_none() {
            self.hint_missing_contract(ui);
        }

        self.render_flow_progress(ui, Tab::Transfer);
    }

    fn render_balance_tab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui::styled_heading(ui, "Token Balance");
        ui.label("Sum of all sUDT cells under a lock. Leave the address empty for your own.");
        ui.add_space(15.0);

        ui.horizontal(|ui| {
            ui.label("Address:");
            ui::address_input(ui, &mut self.balance_state.address);
        });
        ui.add_space(10.0);

        let can_refresh = !self.balance_state.loading && self.chain.sudt.is_some();
        if ui
            .add_enabled(can_refresh, egui::Button::new("⟳ Refresh"))
            .clicked()
        {
            self.trigger_balance_refresh(ctx);
        }
        if self.chain.sudt.is_none() {
            self.hint_missing_contract(ui);
        }

        if self.balance_state.loading {
            ui.add_space(10.0);
            ui::loading_spinner(ui, "Scanning cells...");
        }
        if let Some(total) = self.balance_state.total {
            ui.add_space(15.0);
            ui::section_header(ui, "Balance");
            ui.label(
                egui::RichText::new(format!("{total} tokens"))
                    .monospace()
                    .size(18.0),
            );
        }
        if let Some(error) = &self.balance_state.error {
            ui.add_space(10.0);
            ui::error_message(ui, error);
        }
    }

    fn render_flow_progress(&mut self, ui: &mut egui::Ui, tab: Tab) {
        let progress = match tab {
            Tab::Issue => &self.issue_state.progress,
            Tab::Transfer => &self.transfer_state.progress,
            Tab::Balance => return,
        };

        if progress.processing {
            ui.add_space(10.0);
            ui::loading_spinner(
                ui,
                if progress.submitted.is_some() {
                    "Waiting for confirmation..."
                } else {
                    "Building and sending..."
                },
            );
        }
        if let Some(hash) = &progress.submitted {
            ui.add_space(10.0);
            ui::tx_hash_row(ui, self.chain.env, "Tx:", hash);
        }
        if progress.confirmed.is_some() {
            ui.add_space(5.0);
            ui::success_message(ui, "Transaction committed");
        }
        if let Some(error) = &progress.error {
            ui.add_space(10.0);
            ui::error_message(ui, error);
        }
    }

    fn hint_missing_contract(&self, ui: &mut egui::Ui) {
        ui.add_space(5.0);
        ui.label(
            egui::RichText::new(
                "No sUDT contract configured. Run deploy-sudt and point \
                 SUDT_SCRIPT_CONFIG at the JSON it prints.",
            )
            .weak(),
        );
    }

    fn trigger_issue(&mut self, ctx: &egui::Context) {
        let amount = match parse_amount(&self.issue_state.amount) {
            Ok(n) => n,
            Err(e) => {
                self.issue_state.progress.error = Some(e);
                return;
            }
        };
        let Some(sudt) = self.chain.sudt.clone() else {
            return;
        };
        self.issue_state.progress.begin();

        let chain = Arc::clone(&self.chain);
        let events = Arc::clone(&self.issue_events);
        let ctx = ctx.clone();
        thread::spawn(move || {
            let flow = || -> Result<TransactionView, PortError> {
                let assembler = TxAssembler::for_env(&chain.client, chain.env, DEFAULT_FEE_RATE);
                assembler.build_issue(chain.signer.lock_script(), &sudt, amount)
            };
            run_flow(&chain, flow(), &events, &ctx);
        });
    }

    fn trigger_transfer(&mut self, ctx: &egui::Context) {
        let amount = match parse_amount(&self.transfer_state.amount) {
            Ok(n) => n,
            Err(e) => {
                self.transfer_state.progress.error = Some(e);
                return;
            }
        };
        let recipient = match decode_address(self.transfer_state.recipient.trim(), self.chain.env)
        {
            Ok(script) => script,
            Err(e) => {
                self.transfer_state.progress.error = Some(e.to_string());
                return;
            }
        };
        let Some(sudt) = self.chain.sudt.clone() else {
            return;
        };
        self.transfer_state.progress.begin();

        let chain = Arc::clone(&self.chain);
        let events = Arc::clone(&self.transfer_events);
        let ctx = ctx.clone();
        thread::spawn(move || {
            let flow = || -> Result<TransactionView, PortError> {
                let signer_lock = chain.signer.lock_script();
                let owner_args = signer_lock.calc_script_hash();
                let assembler = TxAssembler::for_env(&chain.client, chain.env, DEFAULT_FEE_RATE);
                assembler.build_transfer(
                    signer_lock,
                    recipient,
                    &sudt,
                    owner_args.as_slice(),
                    amount,
                )
            };
            run_flow(&chain, flow(), &events, &ctx);
        });
    }

    fn trigger_balance_refresh(&mut self, ctx: &egui::Context) {
        let Some(sudt) = self.chain.sudt.clone() else {
            return;
        };
        let lock = match resolve_balance_lock(
            &self.balance_state.address,
            self.chain.signer.lock_script(),
            self.chain.env,
        ) {
            Ok(lock) => lock,
            Err(e) => {
                self.balance_state.error = Some(e);
                return;
            }
        };
        self.balance_state.loading = true;
        self.balance_state.error = None;

        let chain = Arc::clone(&self.chain);
        let slot = Arc::clone(&self.balance_result);
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = (|| -> Result<u128, PortError> {
                // Owner-mode args stay the signer's lock hash whichever
                // address is being queried.
                let owner_args = chain.signer.lock_script().calc_script_hash();
                let udt_type = sudt
                    .type_script(owner_args.as_slice())
                    .map_err(PortError::Validation)?;
                collect_udt_balance(&chain.client, lock, udt_type)
            })();
            if let Err(ref e) = result {
                tracing::warn!("balance lookup failed: {e}");
            }
            *slot.lock().unwrap() = Some(result.map_err(|e| e.to_string()));
            ctx.request_repaint();
        });
    }

    fn drain_flow_events(&mut self) {
        let issue: Vec<FlowEvent> = self.issue_events.lock().unwrap().drain(..).collect();
        for event in issue {
            self.issue_state.progress.apply(event);
        }
        let transfer: Vec<FlowEvent> = self.transfer_events.lock().unwrap().drain(..).collect();
        for event in transfer {
            self.transfer_state.progress.apply(event);
        }
    }

    fn check_balance_result(&mut self) {
        let result = self.balance_result.lock().unwrap().take();
        if let Some(result) = result {
            self.balance_state.loading = false;
            match result {
                Ok(total) => self.balance_state.total = Some(total),
                Err(e) => self.balance_state.error = Some(e),
            }
        }
    }
}

fn parse_amount(input: &str) -> Result<u128, String> {
    match input.trim().parse::<u128>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("Enter a positive whole token amount".to_owned()),
    }
}

/// The lock to query a balance for: the entered address, or the signer's
/// own lock when the field is empty.
fn resolve_balance_lock(
    input: &str,
    own: packed::Script,
    env: NetworkEnv,
) -> Result<packed::Script, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(own);
    }
    decode_address(trimmed, env).map_err(|e| e.to_string())
}

/// Sign, broadcast and poll an assembled transaction, reporting progress
/// through the tab's mailbox.
fn run_flow(
    chain: &ChainContext,
    unsigned: Result<TransactionView, PortError>,
    events: &Mailbox,
    ctx: &egui::Context,
) {
    let result = unsigned.and_then(|tx| submit_and_confirm(chain, tx, events, ctx));
    if let Err(e) = result {
        tracing::warn!("transaction flow failed: {e}");
        push_event(events, ctx, FlowEvent::Failed(e.to_string()));
    }
}

fn submit_and_confirm(
    chain: &ChainContext,
    unsigned: TransactionView,
    events: &Mailbox,
    ctx: &egui::Context,
) -> Result<(), PortError> {
    let signed = chain.signer.sign_transaction(unsigned)?;
    let tx_hash = chain.client.send_transaction(&signed)?;
    tracing::info!("transaction submitted: {tx_hash:#x}");
    push_event(events, ctx, FlowEvent::Submitted(tx_hash.clone()));

    confirm_transaction(
        &chain.client,
        &chain.wait,
        &tx_hash,
        |hash| push_event(events, ctx, FlowEvent::Confirmed(hash.clone())),
        |hash| {
            push_event(
                events,
                ctx,
                FlowEvent::Failed(format!("transaction {hash:#x} was not committed")),
            )
        },
    )?;
    Ok(())
}

fn push_event(events: &Mailbox, ctx: &egui::Context, event: FlowEvent) {
    events.lock().unwrap().push(event);
    ctx.request_repaint();
}
