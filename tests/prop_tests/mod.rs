mod paging;
