use leptos::prelude::*;

use crate::layout::LayoutKind;

/// One button per layout strategy. `on_select` receives the clicked layout.
#[component]
pub fn LayoutMenu<F>(#[prop(into)] current: Signal<LayoutKind>, on_select: F) -> impl IntoView
where
	F: Fn(LayoutKind) + Clone + 'static,
{
	let buttons = LayoutKind::ALL
		.into_iter()
		.map(|kind| {
			let on_select = on_select.clone();
			view! {
				<input
					type="button"
					class="layoutButton"
					class:active=move || current.get() == kind
					id=kind.button_id()
					value=kind.label()
					on:click=move |_| on_select(kind)
				/>
				<br />
			}
		})
		.collect_view();

	view! {
		<div id="layoutMenuContainer" class="layout-menu">
			<label class="menuLabel">"Layouts"</label>
			<br />
			{buttons}
		</div>
	}
}
