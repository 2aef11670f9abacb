//! Footer component

use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>"Data Sweeper • Powered by " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <div class="footer-links">
                <span class="footer-link">"CSV"</span>
                <span class="footer-link">"Excel (.xlsx)"</span>
            </div>
        </footer>
    }
}
