//! Hero section component

use leptos::*;

use crate::APP_NAME;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"🧹 " {APP_NAME}</h1>
            <p class="subtitle">
                "Transform your files between CSV and Excel formats, with built-in data cleaning and visualization. "
                "Upload one or more files to get started."
            </p>
        </div>
    }
}
