pub mod map_view;
pub mod region_list;
pub mod top_recipes;
pub mod zoom_controls;
