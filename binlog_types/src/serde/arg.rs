mod deser;
mod ser;
