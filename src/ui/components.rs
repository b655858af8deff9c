/// Reusable popup pieces

use yew::prelude::*;
use crate::tab_data::GroupSummary;

#[derive(Properties, PartialEq)]
pub struct WindowStatsProps {
    pub tab_count: usize,
    pub group_count: usize,
}

#[function_component(WindowStats)]
pub fn window_stats(props: &WindowStatsProps) -> Html {
    html! {
        <div class="stats-box">
            <div class="stat-item">
                <span class="stat-label">{"Tabs"}</span>
                <span class="stat-count">{props.tab_count}</span>
            </div>
            <div class="stat-item">
                <span class="stat-label">{"Groups"}</span>
                <span class="stat-count">{props.group_count}</span>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupListProps {
    pub groups: Vec<GroupSummary>,
}

/// Groups created by the last classification
#[function_component(GroupList)]
pub fn group_list(props: &GroupListProps) -> Html {
    if props.groups.is_empty() {
        return html! {};
    }

    html! {
        <div class="stats-container">
            <h2 class="stats-title">{"Groups"}</h2>
            {for props.groups.iter().map(|group| html! {
                <div class="group-item">
                    <span
                        class="group-swatch"
                        style={format!("background-color: {};", group.color.hex())}
                    ></span>
                    <span class="group-name">{&group.name}</span>
                    <span class="group-count">{format!("{} tabs", group.member_count)}</span>
                </div>
            })}
        </div>
    }
}
