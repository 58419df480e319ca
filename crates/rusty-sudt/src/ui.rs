//! UI helper components

use ckb_types::H256;
use eframe::egui;

use rusty_sudt_chain_core::NetworkEnv;

/// Block explorer URL for a transaction, when the network has one.
pub fn explorer_tx_url(env: NetworkEnv, tx_hash: &H256) -> Option<String> {
    let base = match env {
        NetworkEnv::Mainnet => "https://explorer.nervos.org",
        NetworkEnv::Testnet => "https://pudge.explorer.nervos.org",
        NetworkEnv::Devnet => return None,
    };
    Some(format!("{base}/transaction/{tx_hash:#x}"))
}

pub fn open_url_new_tab(url: &str) {
    let _ = open::that(url);
}

pub fn copy_to_clipboard(text: &str) {
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(text);
    }
}

/// Styled heading with accent color
pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).color(egui::Color32::from_rgb(0, 212, 170)));
}

/// Section header with separator
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.add_space(10.0);
    ui.label(egui::RichText::new(text).strong().size(14.0));
    ui.separator();
}

pub fn loading_spinner(ui: &mut egui::Ui, label: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(label);
    });
}

pub fn error_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("❌").size(16.0));
        ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(220, 80, 80)));
    });
}

pub fn success_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("✅").size(16.0));
        ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(80, 200, 120)));
    });
}

/// Styled text edit for address input
pub fn address_input(ui: &mut egui::Ui, value: &mut String) -> egui::Response {
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text("ckt1...")
            .desired_width(500.0)
            .font(egui::TextStyle::Monospace),
    )
}

/// Styled text edit for number input
pub fn number_input(ui: &mut egui::Ui, value: &mut String, hint: &str) -> egui::Response {
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(200.0)
            .font(egui::TextStyle::Monospace),
    )
}

/// Display a value with a copy button
pub fn copyable_value(ui: &mut egui::Ui, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(value).monospace().size(12.0));
        if ui
            .small_button("📋")
            .on_hover_text("Copy to clipboard")
            .clicked()
        {
            copy_to_clipboard(value);
        }
    });
}

/// Transaction hash row with copy and explorer-link affordances.
pub fn tx_hash_row(ui: &mut egui::Ui, env: NetworkEnv, label: &str, tx_hash: &H256) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).strong());
        ui.label(
            egui::RichText::new(format!("{tx_hash:#x}"))
                .monospace()
                .size(12.0),
        );
        if ui
            .small_button("📋")
            .on_hover_text("Copy to clipboard")
            .clicked()
        {
            copy_to_clipboard(&format!("{tx_hash:#x}"));
        }
        if let Some(url) = explorer_tx_url(env, tx_hash) {
            if ui.small_button("🔗").on_hover_text("Open in explorer").clicked() {
                open_url_new_tab(&url);
            }
        }
    });
}
