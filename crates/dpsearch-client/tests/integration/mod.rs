mod content;
mod dis_max;
mod search_all;
